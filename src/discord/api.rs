//! Command API backed by Discord's guild application command endpoints

use anyhow::{Context, Result};
use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::{CommandId, GuildId};
use std::sync::Arc;

use crate::commands::api::{CommandApi, RemoteCommand};
use crate::commands::builder::apply_descriptor;
use crate::commands::registry::CommandDescriptor;

pub struct DiscordCommandApi {
    http: Arc<Http>,
}

impl DiscordCommandApi {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn parse_guild(guild_id: &str) -> Result<GuildId> {
    guild_id
        .parse::<u64>()
        .map(GuildId)
        .with_context(|| format!("'{}' is not a Discord guild id", guild_id))
}

#[async_trait]
impl CommandApi for DiscordCommandApi {
    fn validate_guild(&self, guild_id: &str) -> Result<()> {
        parse_guild(guild_id).map(|_| ())
    }

    async fn fetch(&self, guild_id: &str) -> Result<Vec<RemoteCommand>> {
        let commands = parse_guild(guild_id)?
            .get_application_commands(&self.http)
            .await
            .with_context(|| format!("Failed to list commands for guild {}", guild_id))?;

        Ok(commands
            .into_iter()
            .map(|c| RemoteCommand {
                id: c.id.0,
                name: c.name,
            })
            .collect())
    }

    async fn create(&self, guild_id: &str, command: &CommandDescriptor) -> Result<RemoteCommand> {
        let created = parse_guild(guild_id)?
            .create_application_command(&self.http, |c| apply_descriptor(c, command))
            .await
            .with_context(|| format!("Failed to create /{} in guild {}", command.name, guild_id))?;

        Ok(RemoteCommand {
            id: created.id.0,
            name: created.name,
        })
    }

    async fn delete(&self, guild_id: &str, command: &RemoteCommand) -> Result<()> {
        parse_guild(guild_id)?
            .delete_application_command(&self.http, CommandId(command.id))
            .await
            .with_context(|| format!("Failed to delete /{} from guild {}", command.name, guild_id))
    }
}
