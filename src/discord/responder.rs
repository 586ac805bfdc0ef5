//! Responders that deliver [`Reply`]s through serenity
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serenity::builder::{CreateInteractionResponseData, CreateMessage};
use serenity::http::Http;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use crate::commands::request::{Reply, Responder};

fn fill_response<'a, 'b>(
    data: &'b mut CreateInteractionResponseData<'a>,
    reply: Reply,
) -> &'b mut CreateInteractionResponseData<'a> {
    if let Some(content) = reply.content {
        data.content(content);
    }
    if !reply.embeds.is_empty() {
        data.set_embeds(reply.embeds);
    }
    if let Some(components) = reply.components {
        data.set_components(components);
    }
    data.ephemeral(reply.ephemeral)
}

fn fill_message<'a, 'b>(message: &'b mut CreateMessage<'a>, reply: Reply) -> &'b mut CreateMessage<'a> {
    if let Some(content) = reply.content {
        message.content(content);
    }
    if !reply.embeds.is_empty() {
        message.set_embeds(reply.embeds);
    }
    if let Some(components) = reply.components {
        message.set_components(components);
    }
    message
}

async fn send_to_channel(http: &Http, channel_id: ChannelId, reply: Reply) -> Result<()> {
    channel_id
        .send_message(http, |m| fill_message(m, reply))
        .await
        .with_context(|| format!("Failed to send message to channel {}", channel_id))?;
    Ok(())
}

/// Replies to a slash command
pub struct CommandResponder {
    http: Arc<Http>,
    interaction: ApplicationCommandInteraction,
}

impl CommandResponder {
    pub fn new(http: Arc<Http>, interaction: ApplicationCommandInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl Responder for CommandResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_interaction_response(&self.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|data| fill_response(data, reply))
            })
            .await
            .with_context(|| format!("Failed to respond to /{}", self.interaction.data.name))
    }

    async fn send(&self, reply: Reply) -> Result<()> {
        send_to_channel(&self.http, self.interaction.channel_id, reply).await
    }

    async fn delete_origin(&self) -> Result<()> {
        // A slash command has no message of its own to delete
        Ok(())
    }
}

/// Replies to a button press or menu selection
pub struct ComponentResponder {
    http: Arc<Http>,
    interaction: MessageComponentInteraction,
}

impl ComponentResponder {
    pub fn new(http: Arc<Http>, interaction: MessageComponentInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl Responder for ComponentResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_interaction_response(&self.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|data| fill_response(data, reply))
            })
            .await
            .context("Failed to respond to component interaction")
    }

    async fn send(&self, reply: Reply) -> Result<()> {
        send_to_channel(&self.http, self.interaction.channel_id, reply).await
    }

    async fn delete_origin(&self) -> Result<()> {
        // Acknowledge first so the client does not report a failed interaction
        if let Err(e) = self
            .interaction
            .create_interaction_response(&self.http, |response| {
                response.kind(InteractionResponseType::DeferredUpdateMessage)
            })
            .await
        {
            debug!("Component interaction already acknowledged: {}", e);
        }

        self.interaction
            .channel_id
            .delete_message(&self.http, self.interaction.message.id)
            .await
            .context("Failed to delete component message")
    }
}
