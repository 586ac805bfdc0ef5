//! Remote command API seam
//!
//! The publisher only needs fetch/create/delete scoped to a guild; the serenity
//! implementation lives in `discord::api`.

use anyhow::Result;
use async_trait::async_trait;

use super::registry::CommandDescriptor;

/// A command as registered with the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub id: u64,
    pub name: String,
}

#[async_trait]
pub trait CommandApi: Send + Sync {
    /// Reject guild ids this API can never address.
    ///
    /// Checked once per guild before any remote call, so a malformed id fails
    /// immediately instead of being retried.
    fn validate_guild(&self, _guild_id: &str) -> Result<()> {
        Ok(())
    }

    /// List the commands registered for a guild
    async fn fetch(&self, guild_id: &str) -> Result<Vec<RemoteCommand>>;

    /// Register a command for a guild
    async fn create(&self, guild_id: &str, command: &CommandDescriptor) -> Result<RemoteCommand>;

    /// Remove a command from a guild
    async fn delete(&self, guild_id: &str, command: &RemoteCommand) -> Result<()>;
}
