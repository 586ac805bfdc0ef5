//! # Core Commands
//!
//! `help` and `plugins`, plus the plugin picker menu and enable/disable buttons
//! that `plugins` replies with.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: false

use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;

use super::publisher::is_active;
use super::registry::{CommandRegistry, CoreCommand};
use super::request::{CommandRequest, ComponentKind, ComponentRequest, Reply};
use super::toggle::{PluginState, PluginToggle, ToggleAction};
use crate::core::embeds;
use crate::core::error::ToggleError;
use crate::guilds::GuildStore;
use crate::plugins::manifest::Interface;
use crate::plugins::PluginRegistry;

const GUILD_ONLY: &str = "This command can only be used in a server.";

#[derive(Clone)]
pub struct CoreCommands {
    store: GuildStore,
    plugins: Arc<PluginRegistry>,
    commands: Arc<CommandRegistry>,
    toggle: PluginToggle,
}

impl CoreCommands {
    pub fn new(
        store: GuildStore,
        plugins: Arc<PluginRegistry>,
        commands: Arc<CommandRegistry>,
        toggle: PluginToggle,
    ) -> Self {
        Self {
            store,
            plugins,
            commands,
            toggle,
        }
    }

    pub async fn run(&self, command: CoreCommand, request: CommandRequest) -> Result<()> {
        if request.origin.source != Interface::Discord {
            debug!("/{} from {} is not handled", command.name(), request.origin.source.as_str());
            return Ok(());
        }
        let Some(guild_id) = request.origin.guild_id.clone() else {
            return request.origin.reply(Reply::text(GUILD_ONLY).ephemeral()).await;
        };

        match command {
            CoreCommand::Help => self.help(&guild_id, &request).await,
            CoreCommand::Plugins => self.list_plugins(&request).await,
        }
    }

    /// List the commands usable in the guild
    async fn help(&self, guild_id: &str, request: &CommandRequest) -> Result<()> {
        let record = self.store.get(guild_id).await;
        let available: Vec<_> = self
            .commands
            .all()
            .iter()
            .filter(|c| c.on_discord())
            .filter(|c| match &record {
                Some(record) => is_active(c, record),
                None => c.is_core(),
            })
            .cloned()
            .collect();

        let embed = embeds::help_embed(&available, embeds::random_color());
        request.origin.reply(Reply::embed(embed)).await
    }

    async fn list_plugins(&self, request: &CommandRequest) -> Result<()> {
        let mut reply = Reply::embed(embeds::plugins_overview_embed(embeds::random_color()));
        if let Some(menu) = embeds::plugin_menu(self.plugins.all()) {
            reply = reply.with_components(menu);
        }
        request.origin.reply(reply).await
    }

    /// Handle the plugin picker and the enable/disable buttons
    pub async fn handle_component(&self, request: ComponentRequest) -> Result<()> {
        let Some(guild_id) = request.origin.guild_id.clone() else {
            debug!("Ignoring plugins component outside a guild");
            return Ok(());
        };

        match request.kind {
            ComponentKind::Menu => self.show_plugin(&guild_id, &request).await,
            ComponentKind::Button => self.toggle_plugin(&guild_id, &request).await,
        }
    }

    async fn show_plugin(&self, guild_id: &str, request: &ComponentRequest) -> Result<()> {
        if request.payload.kind.as_deref() != Some(embeds::PLUGIN_MENU_KIND) {
            debug!("Ignoring plugins menu with type {:?}", request.payload.kind);
            return Ok(());
        }
        // The menu allows zero selections
        let Some(selected) = request.values.first() else {
            return Ok(());
        };
        let Some(plugin) = self.plugins.get(selected) else {
            debug!("Plugins menu selected unknown plugin {}", selected);
            return Ok(());
        };

        let enabled = self.store.is_enabled(guild_id, &plugin.name).await;
        let reply = Reply::embed(embeds::plugin_detail_embed(&plugin, embeds::random_color()))
            .with_components(embeds::toggle_button(&plugin.name, enabled));
        request.origin.reply(reply).await
    }

    async fn toggle_plugin(&self, guild_id: &str, request: &ComponentRequest) -> Result<()> {
        let action = request.payload.button.as_deref().and_then(ToggleAction::from_button);
        let (Some(action), Some(plugin)) = (action, request.payload.plugin.as_deref()) else {
            debug!("Ignoring incomplete plugins button payload {:?}", request.payload);
            return Ok(());
        };

        let outcome = match self
            .toggle
            .apply(guild_id, plugin, action, request.origin.is_admin)
            .await
        {
            Ok(outcome) => outcome,
            Err(ToggleError::PermissionDenied) => {
                let reply = Reply::embed(embeds::permission_denied_embed()).ephemeral();
                return request.origin.reply(reply).await;
            }
            Err(e @ (ToggleError::UnknownPlugin(_) | ToggleError::UnknownGuild(_))) => {
                warn!("Toggle of {} in {} rejected: {}", plugin, guild_id, e);
                return request.origin.reply(Reply::text(e.to_string()).ephemeral()).await;
            }
            Err(ToggleError::Store(e)) => return Err(e),
        };

        let embed = match outcome.state {
            PluginState::Enabled => embeds::plugin_enabled_embed(plugin),
            PluginState::Disabled => embeds::plugin_disabled_embed(plugin),
        };
        request.origin.responder.send(Reply::embed(embed)).await?;
        request.origin.responder.delete_origin().await
    }
}
