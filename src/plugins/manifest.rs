//! # Plugin Manifest Schema
//!
//! `manifest.json` describing a plugin's identity, handler class and commands.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.9.0
//!
//! ## Changelog
//! - 2.0.0: JSON manifests per plugin directory, commands bound to handler methods
//! - 1.0.0: Initial release with YAML plugin configuration

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

use crate::commands::payload::CUSTOM_ID_LIMIT;
use crate::core::embeds::toggle_custom_id;
use crate::core::error::LoadError;

/// File name looked up in each plugin directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Marker file for directories that are deliberately not plugins
pub const IGNORE_FILE: &str = "ignore";

/// Root of a plugin's manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginManifest {
    /// Unique plugin identifier
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Handler class backing the plugin
    pub class: String,

    /// Commands the plugin contributes
    #[serde(default)]
    pub commands: Vec<CommandManifest>,
}

impl PluginManifest {
    /// Read and validate a manifest file
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: PluginManifest =
            serde_json::from_str(&contents).map_err(|source| LoadError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate command names and descriptions against Discord's limits
    pub fn validate(&self) -> Result<(), LoadError> {
        // The name ends up in menu values and toggle button ids
        let fits = toggle_custom_id(&self.name, "disable").len() <= CUSTOM_ID_LIMIT;
        if !command_name_pattern().is_match(&self.name) || !fits {
            return Err(LoadError::InvalidPluginName {
                name: self.name.clone(),
            });
        }

        for command in &self.commands {
            if !command_name_pattern().is_match(&command.name) {
                return Err(LoadError::InvalidCommandName {
                    plugin: self.name.clone(),
                    command: command.name.clone(),
                });
            }

            let len = command.description.chars().count();
            if len == 0 || len > 100 {
                return Err(LoadError::InvalidDescription {
                    plugin: self.name.clone(),
                    command: command.name.clone(),
                });
            }

            for opt in &command.options {
                if !command_name_pattern().is_match(&opt.name) {
                    return Err(LoadError::InvalidCommandName {
                        plugin: self.name.clone(),
                        command: format!("{} {}", command.name, opt.name),
                    });
                }
            }
        }
        Ok(())
    }
}

fn command_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-_a-z0-9]{1,32}$").expect("static pattern"))
}

/// Transports a command can be exposed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    /// Discord slash commands
    Discord,
    /// Text-console bridge
    Minecraft,
    #[serde(other)]
    Other,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interface::Discord => "discord",
            Interface::Minecraft => "minecraft",
            Interface::Other => "other",
        }
    }
}

fn default_sources() -> Vec<Interface> {
    vec![Interface::Discord]
}

/// A command declared by a plugin
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandManifest {
    /// Command name (lowercase, no spaces)
    pub name: String,

    /// Command description shown in Discord
    pub description: String,

    /// Handler class for this command; defaults to the plugin's class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Method of the handler class bound to this command
    pub method: String,

    /// Command parameters
    #[serde(default)]
    pub options: Vec<CommandOption>,

    /// Transports the command is exposed on
    #[serde(default = "default_sources", alias = "interfaces")]
    pub source: Vec<Interface>,
}

/// A single command option/parameter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandOption {
    /// Option name
    pub name: String,

    /// Option description
    pub description: String,

    /// Option type: string, integer, number, boolean, user, channel, role, attachment
    #[serde(rename = "type", default = "default_string")]
    pub option_type: String,

    /// Whether the option is required
    #[serde(default)]
    pub required: bool,

    /// Predefined choices
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A predefined choice for an option
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Choice {
    /// Display name
    pub name: String,

    /// Actual value (string or number)
    pub value: Value,
}

fn default_string() -> String {
    "string".to_string()
}
