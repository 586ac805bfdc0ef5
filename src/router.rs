//! # Interaction Router
//!
//! Dispatches slash commands, button presses and menu selections to the core
//! commands or to the owning plugin, enforcing per-guild plugin enablement.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: false

use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;

use crate::commands::core_commands::CoreCommands;
use crate::commands::payload::ComponentPayload;
use crate::commands::registry::{CommandDescriptor, CommandOwner, CommandRegistry, CommandTarget, CoreCommand};
use crate::commands::request::{CommandRequest, ComponentKind, ComponentRequest, Origin, Reply};
use crate::guilds::GuildStore;

const PLUGIN_DISABLED: &str = "This plugin is not enabled in this server.";

/// An inbound interaction, already detached from the transport
pub enum InboundInteraction {
    Command(CommandRequest),
    ButtonPress { custom_id: String, origin: Origin },
    MenuSelect {
        custom_id: String,
        values: Vec<String>,
        origin: Origin,
    },
}

/// Why an interaction was not handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No registered command matches
    Unregistered,
    /// Component id is not a JSON payload with a `command`
    Malformed,
    /// The owning plugin is not enabled in the guild
    PluginDisabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Handled,
    Dropped(DropReason),
}

#[derive(Clone)]
pub struct InteractionRouter {
    commands: Arc<CommandRegistry>,
    store: GuildStore,
    core: CoreCommands,
}

impl InteractionRouter {
    pub fn new(commands: Arc<CommandRegistry>, store: GuildStore, core: CoreCommands) -> Self {
        Self {
            commands,
            store,
            core,
        }
    }

    /// Route an interaction to its handler.
    ///
    /// Unregistered commands and malformed component payloads are logged and
    /// dropped without a user-visible reply. Errors come from the handler.
    pub async fn route(&self, interaction: InboundInteraction) -> Result<RouteOutcome> {
        match interaction {
            InboundInteraction::Command(request) => self.route_command(request).await,
            InboundInteraction::ButtonPress { custom_id, origin } => {
                self.route_component(ComponentKind::Button, &custom_id, Vec::new(), origin)
                    .await
            }
            InboundInteraction::MenuSelect {
                custom_id,
                values,
                origin,
            } => {
                self.route_component(ComponentKind::Menu, &custom_id, values, origin)
                    .await
            }
        }
    }

    async fn route_command(&self, request: CommandRequest) -> Result<RouteOutcome> {
        let Some(descriptor) = self.commands.lookup(&request.command) else {
            warn!(
                "[{}] Dropping unregistered command /{}",
                request.origin.request_id, request.command
            );
            return Ok(RouteOutcome::Dropped(DropReason::Unregistered));
        };

        if !self.enabled_for(&descriptor, &request.origin).await {
            debug!(
                "[{}] /{} used where {} is not enabled",
                request.origin.request_id, request.command, descriptor.owner
            );
            request
                .origin
                .reply(Reply::text(PLUGIN_DISABLED).ephemeral())
                .await?;
            return Ok(RouteOutcome::Dropped(DropReason::PluginDisabled));
        }

        debug!(
            "[{}] Routing /{} to {}",
            request.origin.request_id, request.command, descriptor.owner
        );
        match &descriptor.target {
            CommandTarget::Core(command) => self.core.run(*command, request).await?,
            CommandTarget::Plugin { handler, method } => handler.invoke(method, request).await?,
        }
        Ok(RouteOutcome::Handled)
    }

    async fn route_component(
        &self,
        kind: ComponentKind,
        custom_id: &str,
        values: Vec<String>,
        origin: Origin,
    ) -> Result<RouteOutcome> {
        let payload = match ComponentPayload::decode(custom_id) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("[{}] Dropping component {:?}: {}", origin.request_id, custom_id, e);
                return Ok(RouteOutcome::Dropped(DropReason::Malformed));
            }
        };

        let Some(descriptor) = self.commands.lookup(&payload.command) else {
            debug!(
                "[{}] Dropping component for unregistered command {}",
                origin.request_id, payload.command
            );
            return Ok(RouteOutcome::Dropped(DropReason::Unregistered));
        };

        if !self.enabled_for(&descriptor, &origin).await {
            debug!(
                "[{}] Dropping component for {} where it is not enabled",
                origin.request_id, descriptor.owner
            );
            return Ok(RouteOutcome::Dropped(DropReason::PluginDisabled));
        }

        let request = ComponentRequest {
            origin,
            kind,
            payload,
            values,
        };
        match &descriptor.target {
            CommandTarget::Core(CoreCommand::Plugins) => self.core.handle_component(request).await?,
            CommandTarget::Core(CoreCommand::Help) => {
                debug!("help has no components");
                return Ok(RouteOutcome::Dropped(DropReason::Unregistered));
            }
            CommandTarget::Plugin { handler, .. } => handler.handle_component(request).await?,
        }
        Ok(RouteOutcome::Handled)
    }

    /// Core commands are always usable; plugin commands need the plugin enabled
    /// in the originating guild
    async fn enabled_for(&self, descriptor: &CommandDescriptor, origin: &Origin) -> bool {
        match (&descriptor.owner, &origin.guild_id) {
            (CommandOwner::Core, _) => true,
            (CommandOwner::Plugin(plugin), Some(guild_id)) => {
                self.store.is_enabled(guild_id, plugin).await
            }
            (CommandOwner::Plugin(_), None) => false,
        }
    }
}
