//! # Plugins
//!
//! Manifest-driven plugins: each directory under the plugins directory declares a
//! handler class and the commands bound to its methods.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.9.0
//! - **Toggleable**: true (per guild)
//!
//! ## Changelog
//! - 2.0.0: Manifest directory loader, typed handler table, per-guild enablement
//! - 1.0.0: Initial release with config-based plugins

pub mod builtin;
pub mod handler;
pub mod loader;
pub mod manifest;

pub use handler::{HandlerTable, PluginContext, PluginHandler};
pub use loader::PluginLoader;
pub use manifest::{Interface, PluginManifest};

use log::{error, info};
use std::sync::Arc;

use crate::commands::registry::{CommandDescriptor, CommandRegistry};

/// A loaded plugin
#[derive(Clone)]
pub struct PluginDescriptor {
    pub name: String,
    pub description: String,
    /// Handler for the plugin's own class; receives component payloads
    pub handler: Arc<dyn PluginHandler>,
    /// Commands in manifest order
    pub commands: Vec<Arc<CommandDescriptor>>,
}

impl PluginDescriptor {
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Loaded plugins, in load order
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<PluginDescriptor>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit loaded plugins and register their commands.
    ///
    /// A plugin whose name is already taken, or that declares a command name
    /// already registered, is skipped as a whole.
    pub fn assemble(descriptors: Vec<PluginDescriptor>, commands: &mut CommandRegistry) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            if registry.contains(&descriptor.name) {
                error!("Skipping plugin {}: a plugin with that name is already loaded", descriptor.name);
                continue;
            }
            if let Err(e) = commands.register_all(&descriptor.commands) {
                error!("Skipping plugin {}: {}", descriptor.name, e);
                continue;
            }
            registry.plugins.push(Arc::new(descriptor));
        }
        info!(
            "{} plugin(s) active, {} command(s) registered",
            registry.len(),
            commands.len()
        );
        registry
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<PluginDescriptor>> {
        self.plugins.iter().find(|p| p.name == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name == name)
    }

    pub fn all(&self) -> &[Arc<PluginDescriptor>] {
        &self.plugins
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
