//! # Command System
//!
//! The unified command registry, remote publication, plugin toggling and the
//! built-in `/help` and `/plugins` commands.
//!
//! - **Version**: 5.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 5.0.0: Plugin-owned commands, guild-scoped publication and per-guild toggles
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 2.0.0: Remove bang commands, slash-only command system
//! - 1.0.0: Initial reorganization with modular command structure

pub mod api;
pub mod builder;
pub mod core_commands;
pub mod payload;
pub mod publisher;
pub mod registry;
pub mod request;
pub mod toggle;

pub use api::{CommandApi, RemoteCommand};
pub use core_commands::CoreCommands;
pub use payload::ComponentPayload;
pub use publisher::{CommandPublisher, ReconcileReport, RetryPolicy};
pub use registry::{CommandDescriptor, CommandOwner, CommandRegistry, CommandTarget, CoreCommand};
pub use request::{
    CommandArgument, CommandRequest, ComponentKind, ComponentRequest, Origin, Reply, Responder,
};
pub use toggle::{PluginState, PluginToggle, ToggleAction, ToggleOutcome};
