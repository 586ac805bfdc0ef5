//! # Gateway Event Handler
//!
//! Keeps the guild store in step with the guilds the bot can see, reconciles
//! published commands once the cache is ready, and turns serenity interactions
//! into [`InboundInteraction`]s for the router.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0

use log::{error, info, warn};
use serde_json::Value;
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::component::ComponentType;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, Member, PartialGuild, UnavailableGuild};
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;
use serenity::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use super::responder::{CommandResponder, ComponentResponder};
use crate::commands::publisher::CommandPublisher;
use crate::commands::registry::CommandRegistry;
use crate::commands::request::{CommandArgument, CommandRequest, Origin, Reply, Responder};
use crate::guilds::GuildStore;
use crate::plugins::manifest::Interface;
use crate::router::{InboundInteraction, InteractionRouter, RouteOutcome};

const GENERIC_ERROR: &str = "Sorry, something went wrong while handling that.";

pub struct Handler {
    store: GuildStore,
    commands: Arc<CommandRegistry>,
    publisher: CommandPublisher,
    router: InteractionRouter,
}

impl Handler {
    pub fn new(
        store: GuildStore,
        commands: Arc<CommandRegistry>,
        publisher: CommandPublisher,
        router: InteractionRouter,
    ) -> Self {
        Self {
            store,
            commands,
            publisher,
            router,
        }
    }

    fn command_interaction(http: Arc<Http>, command: ApplicationCommandInteraction) -> InboundInteraction {
        let arguments = command
            .data
            .options
            .iter()
            .map(|option| CommandArgument {
                name: option.name.clone(),
                value: option.value.clone().unwrap_or(Value::Null),
            })
            .collect();
        let name = command.data.name.clone();
        let origin = Origin {
            source: Interface::Discord,
            request_id: Uuid::new_v4(),
            guild_id: command.guild_id.map(|id| id.0.to_string()),
            channel_id: command.channel_id.0.to_string(),
            user_id: command.user.id.0.to_string(),
            is_admin: is_admin(command.member.as_ref()),
            responder: Arc::new(CommandResponder::new(http, command)),
        };

        InboundInteraction::Command(CommandRequest {
            origin,
            command: name,
            arguments,
        })
    }

    fn component_interaction(
        http: Arc<Http>,
        component: MessageComponentInteraction,
    ) -> InboundInteraction {
        let custom_id = component.data.custom_id.clone();
        let kind = component.data.component_type;
        let values = component.data.values.clone();
        let origin = Origin {
            source: Interface::Discord,
            request_id: Uuid::new_v4(),
            guild_id: component.guild_id.map(|id| id.0.to_string()),
            channel_id: component.channel_id.0.to_string(),
            user_id: component.user.id.0.to_string(),
            is_admin: is_admin(component.member.as_ref()),
            responder: Arc::new(ComponentResponder::new(http, component)),
        };

        match kind {
            ComponentType::Button => InboundInteraction::ButtonPress { custom_id, origin },
            _ => InboundInteraction::MenuSelect {
                custom_id,
                values,
                origin,
            },
        }
    }

    async fn dispatch(&self, inbound: InboundInteraction, responder: Arc<dyn Responder>, label: String) {
        match self.router.route(inbound).await {
            Ok(RouteOutcome::Handled) => {}
            Ok(RouteOutcome::Dropped(reason)) => {
                info!("Interaction '{}' dropped: {:?}", label, reason);
            }
            Err(e) => {
                error!("Error handling interaction '{}': {:#}", label, e);
                if let Err(why) = responder.reply(Reply::text(GENERIC_ERROR).ephemeral()).await {
                    error!("Failed to send error message: {why}");
                }
            }
        }
    }
}

/// Whether the invoking member holds the administrator permission.
///
/// Direct messages carry no member, so they never count as admin.
pub fn is_admin(member: Option<&Member>) -> bool {
    has_admin(member.and_then(|m| m.permissions))
}

fn has_admin(permissions: Option<Permissions>) -> bool {
    permissions.map_or(false, |p| p.administrator())
}

/// Only a guild joined while running is published from `guild_create`.
///
/// Guilds streamed in at startup arrive with `is_new` false and are reconciled
/// (purge, then publish) once the cache is ready.
fn publishes_on_create(is_new: bool, recorded: bool) -> bool {
    is_new && recorded
}

fn responder_of(inbound: &InboundInteraction) -> Arc<dyn Responder> {
    match inbound {
        InboundInteraction::Command(request) => request.origin.responder.clone(),
        InboundInteraction::ButtonPress { origin, .. } => origin.responder.clone(),
        InboundInteraction::MenuSelect { origin, .. } => origin.responder.clone(),
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected and ready!", ready.user.name);
        info!("Connected to {} guilds", ready.guilds.len());
        info!("{} commands registered", self.commands.len());
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        info!("Cache ready with {} guilds", guilds.len());

        let observed: Vec<(String, String)> = guilds
            .iter()
            .map(|id| {
                let name = ctx
                    .cache
                    .guild(*id)
                    .map(|g| g.name)
                    .unwrap_or_else(|| id.0.to_string());
                (id.0.to_string(), name)
            })
            .collect();

        match self.store.observe_all(observed).await {
            Ok(created) if created > 0 => info!("{} new guilds recorded", created),
            Ok(_) => {}
            Err(e) => error!("Failed to record guilds: {:#}", e),
        }

        self.publisher.reconcile(&self.store, &self.commands).await;
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: bool) {
        let guild_id = guild.id.0.to_string();
        match self.store.observe(&guild_id, &guild.name).await {
            Ok(recorded) if publishes_on_create(is_new, recorded) => {
                info!("Joined new guild: {} ({})", guild.name, guild_id);
                self.publisher
                    .publish_guild(&self.store, &self.commands, &guild_id)
                    .await;
            }
            Ok(_) => {}
            Err(e) => error!("Failed to record guild {}: {:#}", guild_id, e),
        }
    }

    async fn guild_update(&self, _ctx: Context, _old: Option<Guild>, guild: PartialGuild) {
        if let Err(e) = self.store.rename(&guild.id.0.to_string(), &guild.name).await {
            error!("Failed to rename guild {}: {:#}", guild.id, e);
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        if incomplete.unavailable {
            warn!("Guild {} is unavailable (outage)", incomplete.id);
            return;
        }
        if let Err(e) = self.store.remove(&incomplete.id.0.to_string()).await {
            error!("Failed to forget guild {}: {:#}", incomplete.id, e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let (inbound, label) = match interaction {
            Interaction::ApplicationCommand(command) => {
                let label = format!("/{}", command.data.name);
                (Self::command_interaction(ctx.http.clone(), command), label)
            }
            Interaction::MessageComponent(component) => {
                let label = component.data.custom_id.clone();
                (Self::component_interaction(ctx.http.clone(), component), label)
            }
            _ => return,
        };
        let responder = responder_of(&inbound);
        self.dispatch(inbound, responder, label).await;
    }
}
