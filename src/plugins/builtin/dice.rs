//! # Plugin: Dice
//!
//! `/roll` with a "Roll again" button that repeats the same roll.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: true

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use rand::Rng;
use serenity::builder::{CreateComponents, CreateEmbed};
use serenity::model::application::component::ButtonStyle;
use std::sync::Arc;

use crate::commands::payload::ComponentPayload;
use crate::commands::request::{CommandRequest, ComponentKind, ComponentRequest, Reply};
use crate::core::embeds::random_color;
use crate::plugins::handler::{PluginContext, PluginHandler};

pub const CLASS: &str = "dice";

const DEFAULT_SIDES: i64 = 6;
const MAX_SIDES: i64 = 1000;
const MAX_COUNT: i64 = 20;

pub fn construct(ctx: PluginContext) -> Result<Arc<dyn PluginHandler>> {
    Ok(Arc::new(Dice { ctx }))
}

pub struct Dice {
    ctx: PluginContext,
}

/// A validated roll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Roll {
    sides: i64,
    count: i64,
}

impl Roll {
    fn new(sides: Option<i64>, count: Option<i64>) -> Self {
        Self {
            sides: sides.unwrap_or(DEFAULT_SIDES).clamp(2, MAX_SIDES),
            count: count.unwrap_or(1).clamp(1, MAX_COUNT),
        }
    }

    fn throw(&self) -> Vec<i64> {
        let mut rng = rand::rng();
        (0..self.count).map(|_| rng.random_range(1..=self.sides)).collect()
    }

    /// Button payload that repeats this roll
    fn payload(&self, command: &str) -> ComponentPayload {
        ComponentPayload::new(command)
            .with_button("reroll")
            .with_field("sides", self.sides)
            .with_field("count", self.count)
    }
}

fn roll_reply(command: &str, roll: Roll, results: &[i64]) -> Reply {
    let total: i64 = results.iter().sum();
    let faces: Vec<String> = results.iter().map(|r| r.to_string()).collect();

    let mut embed = CreateEmbed::default();
    embed.title(format!("🎲 {}d{}", roll.count, roll.sides));
    embed.description(format!("{} = **{}**", faces.join(" + "), total));
    embed.color(random_color());

    let custom_id = roll.payload(command).encode();
    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        row.create_button(|btn| {
            btn.custom_id(custom_id)
                .label("Roll again")
                .style(ButtonStyle::Secondary)
        })
    });

    Reply::embed(embed).with_components(components)
}

#[async_trait]
impl PluginHandler for Dice {
    fn methods(&self) -> &'static [&'static str] {
        &["roll"]
    }

    async fn invoke(&self, method: &str, request: CommandRequest) -> Result<()> {
        match method {
            "roll" => {
                let roll = Roll::new(
                    request.integer_argument("sides"),
                    request.integer_argument("count"),
                );
                let results = roll.throw();
                info!(
                    target: &self.ctx.log_target,
                    "[{}] {}d{} for user {}",
                    request.origin.request_id,
                    roll.count,
                    roll.sides,
                    request.origin.user_id
                );
                request
                    .origin
                    .reply(roll_reply(&request.command, roll, &results))
                    .await
            }
            other => anyhow::bail!("dice has no method {}", other),
        }
    }

    async fn handle_component(&self, request: ComponentRequest) -> Result<()> {
        if request.kind != ComponentKind::Button || request.payload.button.as_deref() != Some("reroll") {
            return Ok(());
        }

        let field = |key: &str| request.payload.field(key).and_then(|v| v.as_i64());
        let roll = Roll::new(field("sides"), field("count"));
        let results = roll.throw();
        request
            .origin
            .reply(roll_reply(&request.payload.command, roll, &results))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::request::CommandArgument;
    use crate::testing;
    use serde_json::Value;

    #[test]
    fn test_roll_clamps_inputs() {
        assert_eq!(Roll::new(None, None), Roll { sides: 6, count: 1 });
        assert_eq!(Roll::new(Some(1), Some(0)), Roll { sides: 2, count: 1 });
        assert_eq!(Roll::new(Some(5000), Some(99)), Roll { sides: 1000, count: 20 });
    }

    #[test]
    fn test_throw_stays_in_range() {
        let roll = Roll::new(Some(4), Some(20));
        let results = roll.throw();
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|r| (1..=4).contains(r)));
    }

    #[tokio::test]
    async fn test_roll_replies_with_reroll_button() {
        let (_dir, services) = testing::temp_services().await;
        let dice = construct(PluginContext::new("dice", services)).unwrap();
        let (request, responder) = testing::command_request(
            "roll",
            vec![CommandArgument {
                name: "sides".to_string(),
                value: Value::from(20),
            }],
            "1",
            false,
        );

        dice.invoke("roll", request).await.unwrap();

        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        let components = replies[0].components.as_ref().unwrap();
        let custom_id = components.0[0]["components"][0]["custom_id"].as_str().unwrap();
        let payload = ComponentPayload::decode(custom_id).unwrap();
        assert_eq!(payload.command, "roll");
        assert_eq!(payload.field("sides"), Some(&Value::from(20)));
        assert_eq!(payload.field("count"), Some(&Value::from(1)));
    }

    #[tokio::test]
    async fn test_reroll_button_repeats_roll() {
        let (_dir, services) = testing::temp_services().await;
        let dice = construct(PluginContext::new("dice", services)).unwrap();
        let payload = Roll { sides: 8, count: 3 }.payload("roll");
        let (request, responder) =
            testing::component_request(ComponentKind::Button, payload, vec![], "1", false);

        dice.handle_component(request).await.unwrap();

        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].embeds[0].0["title"], Value::from("🎲 3d8"));
    }

    #[tokio::test]
    async fn test_unknown_method_is_an_error() {
        let (_dir, services) = testing::temp_services().await;
        let dice = construct(PluginContext::new("dice", services)).unwrap();
        let (request, _) = testing::command_request("roll", vec![], "1", false);
        assert!(dice.invoke("explode", request).await.is_err());
    }
}
