//! # Core Event Bus
//!
//! Broadcast notifications about plugin and command lifecycle. Plugins subscribe
//! through their `PluginContext`; nobody is required to listen.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: false

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Broadcast channel capacity for core events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events emitted by the plugin core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoreEvent {
    /// All manifests have been processed
    PluginsLoaded { count: usize },
    /// A slash command was created remotely for a guild
    CommandCreated { guild_id: String, name: String },
    /// A slash command was removed remotely from a guild
    CommandDeleted { guild_id: String, name: String },
    /// A plugin was switched on for a guild
    PluginEnabled { guild_id: String, plugin: String },
    /// A plugin was switched off for a guild
    PluginDisabled { guild_id: String, plugin: String },
}

/// Cloneable handle to the core event broadcast channel
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Emit an event to all current subscribers
    pub fn emit(&self, event: CoreEvent) {
        debug!("Core event: {event:?}");
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
