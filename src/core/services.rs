//! Services handed to every plugin handler at construction time

use crate::core::events::EventBus;
use crate::guilds::GuildStore;

/// Core services a plugin may use: guild store access and event emission.
///
/// Cloning is cheap; every field is a shared handle.
#[derive(Clone)]
pub struct CoreServices {
    pub guilds: GuildStore,
    pub events: EventBus,
}

impl CoreServices {
    pub fn new(guilds: GuildStore, events: EventBus) -> Self {
        Self { guilds, events }
    }
}
