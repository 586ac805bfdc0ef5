//! # Guilds
//!
//! Per-guild configuration: which plugins each server has switched on.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: false

pub mod record;
pub mod store;

pub use record::GuildRecord;
pub use store::GuildStore;
