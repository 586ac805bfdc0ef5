//! Persisted per-guild record

use serde::{Deserialize, Serialize};

/// One guild the bot is a member of, with its plugin enablement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled_plugins: Vec<String>,
}

impl GuildRecord {
    /// New record; every plugin starts disabled
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled_plugins: Vec::new(),
        }
    }

    pub fn is_enabled(&self, plugin: &str) -> bool {
        self.enabled_plugins.iter().any(|p| p == plugin)
    }

    /// Returns true if the plugin was not already enabled
    pub fn enable(&mut self, plugin: &str) -> bool {
        if self.is_enabled(plugin) {
            return false;
        }
        self.enabled_plugins.push(plugin.to_string());
        true
    }

    /// Returns true if the plugin was enabled
    pub fn disable(&mut self, plugin: &str) -> bool {
        let before = self.enabled_plugins.len();
        self.enabled_plugins.retain(|p| p != plugin);
        self.enabled_plugins.len() != before
    }
}
