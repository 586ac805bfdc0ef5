//! # Core Module
//!
//! Configuration, errors, events, shared services and Discord presentation
//! helpers used across the bot.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Add error, events, services and embeds; drop message chunking
//! - 1.1.0: Add response module with Discord message chunking utilities
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod embeds;
pub mod error;
pub mod events;
pub mod response;
pub mod services;

pub use config::Config;
pub use error::{LoadError, PayloadError, RegistryError, ToggleError};
pub use events::{CoreEvent, EventBus};
pub use response::{menu_preview, truncate_for_embed, truncate_for_field, EMBED_LIMIT, FIELD_LIMIT};
pub use services::CoreServices;
