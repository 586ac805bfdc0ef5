//! Normalized requests handed to command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//!
//! ## Changelog
//! - 1.0.0: Replaces direct use of serenity interactions inside handlers

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use serenity::builder::{CreateComponents, CreateEmbed};
use std::sync::Arc;
use uuid::Uuid;

use super::payload::ComponentPayload;
use crate::plugins::manifest::Interface;

/// A message to send back, independent of the transport
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    pub components: Option<CreateComponents>,
    /// Only visible to the invoking user
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: CreateEmbed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn with_components(mut self, components: CreateComponents) -> Self {
        self.components = Some(components);
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

/// Sends replies for one inbound interaction
#[async_trait]
pub trait Responder: Send + Sync {
    /// Respond to the interaction itself
    async fn reply(&self, reply: Reply) -> Result<()>;

    /// Post a new message in the channel the interaction came from
    async fn send(&self, reply: Reply) -> Result<()>;

    /// Delete the message that carried the pressed component (no-op for commands)
    async fn delete_origin(&self) -> Result<()>;
}

/// Where an interaction came from and who sent it
#[derive(Clone)]
pub struct Origin {
    pub source: Interface,
    pub request_id: Uuid,
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub user_id: String,
    /// Requester holds the administrator permission on the guild
    pub is_admin: bool,
    pub responder: Arc<dyn Responder>,
}

impl Origin {
    pub async fn reply(&self, reply: Reply) -> Result<()> {
        self.responder.reply(reply).await
    }
}

/// A named argument supplied with a command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandArgument {
    pub name: String,
    pub value: Value,
}

/// A command invocation
#[derive(Clone)]
pub struct CommandRequest {
    pub origin: Origin,
    pub command: String,
    pub arguments: Vec<CommandArgument>,
}

impl CommandRequest {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }

    pub fn string_argument(&self, name: &str) -> Option<String> {
        self.argument(name)
            .and_then(|val| val.as_str())
            .map(|s| s.to_string())
    }

    pub fn integer_argument(&self, name: &str) -> Option<i64> {
        self.argument(name).and_then(|val| val.as_i64())
    }

    pub fn bool_argument(&self, name: &str) -> Option<bool> {
        self.argument(name).and_then(|val| val.as_bool())
    }
}

/// Which kind of message component was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Button,
    Menu,
}

/// A decoded button press or menu selection
#[derive(Clone)]
pub struct ComponentRequest {
    pub origin: Origin,
    pub kind: ComponentKind,
    pub payload: ComponentPayload,
    /// Selected values (menus only)
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingResponder;

    fn request(arguments: Vec<CommandArgument>) -> CommandRequest {
        CommandRequest {
            origin: Origin {
                source: Interface::Discord,
                request_id: Uuid::new_v4(),
                guild_id: Some("1".to_string()),
                channel_id: "10".to_string(),
                user_id: "100".to_string(),
                is_admin: false,
                responder: Arc::new(RecordingResponder::default()),
            },
            command: "roll".to_string(),
            arguments,
        }
    }

    #[test]
    fn test_typed_argument_accessors() {
        let req = request(vec![
            CommandArgument {
                name: "city".to_string(),
                value: Value::from("Cairo"),
            },
            CommandArgument {
                name: "days".to_string(),
                value: Value::from(3),
            },
            CommandArgument {
                name: "metric".to_string(),
                value: Value::from(true),
            },
        ]);

        assert_eq!(req.string_argument("city").as_deref(), Some("Cairo"));
        assert_eq!(req.integer_argument("days"), Some(3));
        assert_eq!(req.bool_argument("metric"), Some(true));
        assert_eq!(req.string_argument("days"), None);
        assert!(req.argument("missing").is_none());
    }

    #[test]
    fn test_reply_builders() {
        let reply = Reply::text("hi").ephemeral();
        assert_eq!(reply.content.as_deref(), Some("hi"));
        assert!(reply.ephemeral);
        assert!(reply.embeds.is_empty());

        let reply = Reply::embed(CreateEmbed::default()).with_components(CreateComponents::default());
        assert_eq!(reply.embeds.len(), 1);
        assert!(reply.components.is_some());
        assert!(!reply.ephemeral);
    }

    #[tokio::test]
    async fn test_origin_reply_goes_through_responder() {
        let responder = Arc::new(RecordingResponder::default());
        let mut req = request(vec![]);
        req.origin.responder = responder.clone();

        req.origin.reply(Reply::text("pong")).await.unwrap();

        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content.as_deref(), Some("pong"));
    }
}
