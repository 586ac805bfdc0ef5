//! Plugin handler trait and handler factory table
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//!
//! ## Changelog
//! - 1.0.0: Typed method table replaces binding handler methods by name at call time

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::request::{CommandRequest, ComponentRequest};
use crate::core::services::CoreServices;

/// What a plugin handler is given when it is constructed
#[derive(Clone)]
pub struct PluginContext {
    /// Name of the plugin this handler serves
    pub plugin: String,
    /// `log` target for the plugin's messages (`plugin::<name>`)
    pub log_target: String,
    /// Guild store and event bus
    pub services: CoreServices,
}

impl PluginContext {
    pub fn new(plugin: impl Into<String>, services: CoreServices) -> Self {
        let plugin = plugin.into();
        Self {
            log_target: format!("plugin::{}", plugin),
            plugin,
            services,
        }
    }
}

/// Trait for plugin handlers
///
/// A handler exposes a fixed set of methods. Manifests bind commands to these
/// methods by name, and the loader rejects any command whose method is not listed
/// in `methods()`, so `invoke` only ever sees names it declared.
///
/// # Example
///
/// ```ignore
/// pub struct Coin;
///
/// #[async_trait]
/// impl PluginHandler for Coin {
///     fn methods(&self) -> &'static [&'static str] {
///         &["flip"]
///     }
///
///     async fn invoke(&self, method: &str, request: CommandRequest) -> Result<()> {
///         request.origin.reply(Reply::text("heads")).await
///     }
/// }
/// ```
#[async_trait]
pub trait PluginHandler: Send + Sync {
    /// Methods commands may be bound to
    fn methods(&self) -> &'static [&'static str];

    /// Run a bound method for a command invocation
    async fn invoke(&self, method: &str, request: CommandRequest) -> Result<()>;

    /// Handle a button press or menu selection whose payload names one of this
    /// plugin's commands
    async fn handle_component(&self, _request: ComponentRequest) -> Result<()> {
        Ok(())
    }
}

/// Builds a handler for a plugin
pub type HandlerConstructor = fn(PluginContext) -> Result<Arc<dyn PluginHandler>>;

/// Maps a manifest `class` to the constructor for its handler
#[derive(Clone, Default)]
pub struct HandlerTable {
    constructors: HashMap<String, HandlerConstructor>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every handler compiled into the bot
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(super::builtin::dice::CLASS, super::builtin::dice::construct);
        table
    }

    pub fn register(&mut self, class: impl Into<String>, constructor: HandlerConstructor) {
        self.constructors.insert(class.into(), constructor);
    }

    pub fn get(&self, class: &str) -> Option<HandlerConstructor> {
        self.constructors.get(class).copied()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
