// Core layer - config, errors, events and presentation helpers
pub mod core;

// Per-guild plugin enablement
pub mod guilds;

// Plugin discovery and handlers
pub mod plugins;

// Command registry, publication and toggles
pub mod commands;

// Interaction dispatch
pub mod router;

// Discord transport
pub mod discord;

#[cfg(test)]
mod testing;

pub use core::Config;
