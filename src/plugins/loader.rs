//! Plugin directory loader
//!
//! Every subdirectory of the plugins directory holding a `manifest.json` is one
//! plugin. Handlers are built from the [`HandlerTable`] and bound to the commands
//! the manifest declares.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::handler::{HandlerTable, PluginContext, PluginHandler};
use super::manifest::{PluginManifest, IGNORE_FILE, MANIFEST_FILE};
use super::PluginDescriptor;
use crate::commands::registry::{CommandDescriptor, CommandOwner, CommandTarget};
use crate::core::error::LoadError;
use crate::core::services::CoreServices;

pub struct PluginLoader {
    dir: PathBuf,
    handlers: HandlerTable,
    services: CoreServices,
}

impl PluginLoader {
    pub fn new(dir: impl Into<PathBuf>, handlers: HandlerTable, services: CoreServices) -> Self {
        Self {
            dir: dir.into(),
            handlers,
            services,
        }
    }

    /// Load every plugin in the directory.
    ///
    /// A plugin that fails to load is logged and skipped; only an unreadable
    /// directory fails the whole load. A missing directory yields no plugins.
    pub fn load(&self) -> Result<Vec<PluginDescriptor>, LoadError> {
        if !self.dir.exists() {
            warn!("Plugin directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let unreadable = |source| LoadError::DirectoryUnreadable {
            path: self.dir.clone(),
            source,
        };

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut plugins = Vec::new();
        for dir in dirs {
            if !dir.join(MANIFEST_FILE).is_file() {
                if dir.join(IGNORE_FILE).exists() {
                    debug!("Ignoring {}", dir.display());
                } else {
                    error!("No {} in plugin directory {}", MANIFEST_FILE, dir.display());
                }
                continue;
            }

            match self.load_plugin(&dir) {
                Ok(plugin) => {
                    info!(
                        "Loaded plugin {} with {} command(s)",
                        plugin.name,
                        plugin.commands.len()
                    );
                    plugins.push(plugin);
                }
                Err(e) => error!("Skipping plugin in {}: {}", dir.display(), e),
            }
        }

        Ok(plugins)
    }

    /// Load the plugin in a single directory
    pub fn load_plugin(&self, dir: &Path) -> Result<PluginDescriptor, LoadError> {
        let manifest = PluginManifest::from_file(&dir.join(MANIFEST_FILE))?;

        if let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) {
            if dir_name != manifest.name {
                debug!(
                    "Plugin directory {} declares plugin name {}",
                    dir_name, manifest.name
                );
            }
        }

        // One handler instance per class within a plugin
        let mut instances: HashMap<String, Arc<dyn PluginHandler>> = HashMap::new();
        let handler = self.instantiate(&manifest.name, &manifest.class, &mut instances)?;

        let mut commands = Vec::with_capacity(manifest.commands.len());
        for command in &manifest.commands {
            let class = command.class.as_deref().unwrap_or(&manifest.class);
            let command_handler = self.instantiate(&manifest.name, class, &mut instances)?;

            if !command_handler.methods().contains(&command.method.as_str()) {
                return Err(LoadError::UnknownMethod {
                    plugin: manifest.name.clone(),
                    command: command.name.clone(),
                    class: class.to_string(),
                    method: command.method.clone(),
                });
            }

            commands.push(Arc::new(CommandDescriptor {
                name: command.name.clone(),
                description: command.description.clone(),
                options: command.options.clone(),
                owner: CommandOwner::Plugin(manifest.name.clone()),
                sources: command.source.clone(),
                target: CommandTarget::Plugin {
                    handler: command_handler,
                    method: command.method.clone(),
                },
            }));
        }

        Ok(PluginDescriptor {
            name: manifest.name,
            description: manifest.description,
            handler,
            commands,
        })
    }

    fn instantiate(
        &self,
        plugin: &str,
        class: &str,
        instances: &mut HashMap<String, Arc<dyn PluginHandler>>,
    ) -> Result<Arc<dyn PluginHandler>, LoadError> {
        if let Some(existing) = instances.get(class) {
            return Ok(Arc::clone(existing));
        }

        let constructor = self
            .handlers
            .get(class)
            .ok_or_else(|| LoadError::UnknownHandlerClass {
                plugin: plugin.to_string(),
                class: class.to_string(),
            })?;

        let handler = constructor(PluginContext::new(plugin, self.services.clone())).map_err(|e| {
            LoadError::HandlerInit {
                plugin: plugin.to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        instances.insert(class.to_string(), Arc::clone(&handler));
        Ok(handler)
    }
}
