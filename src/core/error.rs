//! Error taxonomy for the plugin core
//!
//! Plumbing uses `anyhow`; these types exist where callers branch on the kind.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0

use std::path::PathBuf;
use thiserror::Error;

/// Why a plugin (or the whole plugin directory) could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read plugin directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid plugin name '{name}' (lowercase, digits, '-' or '_', max 32 chars, and must fit a component id)")]
    InvalidPluginName { name: String },

    #[error("plugin '{plugin}': invalid command name '{command}' (lowercase, digits, '-' or '_', max 32 chars)")]
    InvalidCommandName { plugin: String, command: String },

    #[error("plugin '{plugin}': description of '{command}' must be 1-100 characters")]
    InvalidDescription { plugin: String, command: String },

    #[error("plugin '{plugin}': no handler registered for class '{class}'")]
    UnknownHandlerClass { plugin: String, class: String },

    #[error("plugin '{plugin}': command '{command}' binds unknown method '{method}' on class '{class}'")]
    UnknownMethod {
        plugin: String,
        command: String,
        class: String,
        method: String,
    },

    #[error("plugin '{plugin}': handler failed to initialize: {reason}")]
    HandlerInit { plugin: String, reason: String },
}

/// Conflicts detected while building the command registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{name}' from '{new_owner}' conflicts with the one registered by '{existing_owner}'")]
    DuplicateCommand {
        name: String,
        existing_owner: String,
        new_owner: String,
    },
}

/// Rejected plugin toggles
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("you do not have permission to edit the server's plugins")]
    PermissionDenied,

    #[error("no plugin named '{0}' is installed")]
    UnknownPlugin(String),

    #[error("guild {0} is not known to the guild store")]
    UnknownGuild(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Undecodable button/menu identifiers
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("component id is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("component id has no 'command' discriminator")]
    MissingCommand,
}
