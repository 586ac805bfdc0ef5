//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 2.0.0: Descriptors carry owner, options and transports; duplicate names are rejected
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::RegistryError;
use crate::plugins::handler::PluginHandler;
use crate::plugins::manifest::{CommandOption, Interface};

/// Built-in commands that exist regardless of plugin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    Help,
    Plugins,
}

impl CoreCommand {
    pub const ALL: [CoreCommand; 2] = [CoreCommand::Help, CoreCommand::Plugins];

    pub fn name(&self) -> &'static str {
        match self {
            CoreCommand::Help => "help",
            CoreCommand::Plugins => "plugins",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CoreCommand::Help => "Lists the commands available in this server",
            CoreCommand::Plugins => "View and toggle this server's plugins",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Who contributed a command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandOwner {
    Core,
    Plugin(String),
}

impl CommandOwner {
    pub fn is_core(&self) -> bool {
        matches!(self, CommandOwner::Core)
    }

    pub fn plugin(&self) -> Option<&str> {
        match self {
            CommandOwner::Core => None,
            CommandOwner::Plugin(name) => Some(name),
        }
    }
}

impl fmt::Display for CommandOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOwner::Core => write!(f, "core"),
            CommandOwner::Plugin(name) => write!(f, "{}", name),
        }
    }
}

/// What runs when the command is invoked
#[derive(Clone)]
pub enum CommandTarget {
    Core(CoreCommand),
    Plugin {
        handler: Arc<dyn PluginHandler>,
        method: String,
    },
}

impl fmt::Debug for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandTarget::Core(command) => f.debug_tuple("Core").field(command).finish(),
            CommandTarget::Plugin { method, .. } => {
                f.debug_struct("Plugin").field("method", method).finish_non_exhaustive()
            }
        }
    }
}

/// A registered command
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    pub owner: CommandOwner,
    /// Transports the command is exposed on
    pub sources: Vec<Interface>,
    pub target: CommandTarget,
}

impl CommandDescriptor {
    pub fn core(command: CoreCommand) -> Self {
        Self {
            name: command.name().to_string(),
            description: command.description().to_string(),
            options: Vec::new(),
            owner: CommandOwner::Core,
            sources: vec![Interface::Discord, Interface::Minecraft],
            target: CommandTarget::Core(command),
        }
    }

    pub fn is_core(&self) -> bool {
        self.owner.is_core()
    }

    /// Whether the command is published as a slash command
    pub fn on_discord(&self) -> bool {
        self.sources.contains(&Interface::Discord)
    }
}

/// Append-only registry of every command the bot knows, core and plugin
///
/// Command names are unique across the registry. Registration order is kept so
/// listings and publishing are deterministic.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<CommandDescriptor>>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the core `help` and `plugins` commands
    pub fn with_core_commands() -> Self {
        let mut registry = Self::new();
        for command in CoreCommand::ALL {
            // Core names are distinct, so this cannot conflict
            let _ = registry.register(CommandDescriptor::core(command));
        }
        registry
    }

    /// Register a single command
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        self.check_free(&descriptor)?;
        self.insert(Arc::new(descriptor));
        Ok(())
    }

    /// Register a group of commands as a unit
    ///
    /// If any name is already taken (or repeated within the group) nothing is
    /// registered.
    pub fn register_all(&mut self, descriptors: &[Arc<CommandDescriptor>]) -> Result<(), RegistryError> {
        for (i, descriptor) in descriptors.iter().enumerate() {
            self.check_free(descriptor)?;
            if let Some(earlier) = descriptors[..i].iter().find(|d| d.name == descriptor.name) {
                return Err(RegistryError::DuplicateCommand {
                    name: descriptor.name.clone(),
                    existing_owner: earlier.owner.to_string(),
                    new_owner: descriptor.owner.to_string(),
                });
            }
        }
        for descriptor in descriptors {
            self.insert(Arc::clone(descriptor));
        }
        Ok(())
    }

    /// Look up a command by name
    pub fn lookup(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.index.get(name).map(|&i| Arc::clone(&self.commands[i]))
    }

    /// All commands in registration order
    pub fn all(&self) -> &[Arc<CommandDescriptor>] {
        &self.commands
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get all registered command names
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    fn check_free(&self, descriptor: &CommandDescriptor) -> Result<(), RegistryError> {
        match self.lookup(&descriptor.name) {
            Some(existing) => Err(RegistryError::DuplicateCommand {
                name: descriptor.name.clone(),
                existing_owner: existing.owner.to_string(),
                new_owner: descriptor.owner.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, descriptor: Arc<CommandDescriptor>) {
        self.index.insert(descriptor.name.clone(), self.commands.len());
        self.commands.push(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn plugin_command(name: &str, plugin: &str) -> CommandDescriptor {
        CommandDescriptor {
            name: name.to_string(),
            description: format!("{} command", name),
            options: Vec::new(),
            owner: CommandOwner::Plugin(plugin.to_string()),
            sources: vec![Interface::Discord],
            target: CommandTarget::Plugin {
                handler: testing::noop_handler(),
                method: name.to_string(),
            },
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_core_commands_present() {
        let registry = CommandRegistry::with_core_commands();
        assert_eq!(registry.command_names().collect::<Vec<_>>(), vec!["help", "plugins"]);

        let help = registry.lookup("help").unwrap();
        assert!(help.is_core());
        assert!(help.on_discord());
        assert!(matches!(help.target, CommandTarget::Core(CoreCommand::Help)));
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CommandRegistry::with_core_commands();
        registry.register(plugin_command("forecast", "weather")).unwrap();

        assert!(registry.contains("forecast"));
        let found = registry.lookup("forecast").unwrap();
        assert_eq!(found.owner.plugin(), Some("weather"));
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_duplicate_with_core_rejected() {
        let mut registry = CommandRegistry::with_core_commands();
        let err = registry.register(plugin_command("help", "weather")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateCommand {
                name: "help".to_string(),
                existing_owner: "core".to_string(),
                new_owner: "weather".to_string(),
            }
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_all_is_atomic() {
        let mut registry = CommandRegistry::with_core_commands();
        registry.register(plugin_command("forecast", "weather")).unwrap();

        let result = registry.register_all(&[
            Arc::new(plugin_command("radar", "storms")),
            Arc::new(plugin_command("forecast", "storms")),
        ]);

        assert!(result.is_err());
        assert!(!registry.contains("radar"));
        assert_eq!(registry.lookup("forecast").unwrap().owner.plugin(), Some("weather"));
    }

    #[test]
    fn test_register_all_rejects_repeats_within_group() {
        let mut registry = CommandRegistry::new();
        let result = registry.register_all(&[
            Arc::new(plugin_command("roll", "dice")),
            Arc::new(plugin_command("roll", "dice")),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateCommand { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_core_command_names_round_trip() {
        for command in CoreCommand::ALL {
            assert_eq!(CoreCommand::from_name(command.name()), Some(command));
        }
        assert_eq!(CoreCommand::from_name("forecast"), None);
    }
}
