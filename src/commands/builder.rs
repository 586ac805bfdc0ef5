//! # Slash Command Builder
//!
//! Turns a command descriptor's option schema into a Discord slash command.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.9.0
//!
//! ## Changelog
//! - 3.0.0: One top-level command per descriptor, choices taken from JSON values
//! - 2.0.0: Consolidate all plugins under single /plugins command with subcommands
//! - 1.0.0: Initial release with per-plugin top-level commands

use serde_json::Value;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::CommandOptionType;

use super::registry::CommandDescriptor;
use crate::plugins::manifest::CommandOption;

/// Fill a slash command builder from a descriptor
pub fn apply_descriptor<'a>(
    cmd: &'a mut CreateApplicationCommand,
    descriptor: &CommandDescriptor,
) -> &'a mut CreateApplicationCommand {
    cmd.name(&descriptor.name).description(&descriptor.description);

    // Discord requires required options to come first
    let (required, optional): (Vec<&CommandOption>, Vec<&CommandOption>) =
        descriptor.options.iter().partition(|o| o.required);

    for opt in required.into_iter().chain(optional) {
        cmd.create_option(|o| apply_option(o, opt));
    }

    cmd
}

/// Build a standalone slash command for a descriptor
pub fn build_command(descriptor: &CommandDescriptor) -> CreateApplicationCommand {
    let mut cmd = CreateApplicationCommand::default();
    apply_descriptor(&mut cmd, descriptor);
    cmd
}

fn apply_option<'a>(
    o: &'a mut CreateApplicationCommandOption,
    opt: &CommandOption,
) -> &'a mut CreateApplicationCommandOption {
    let kind = parse_option_type(&opt.option_type);
    o.name(&opt.name)
        .description(&opt.description)
        .kind(kind)
        .required(opt.required);

    for choice in &opt.choices {
        match (kind, &choice.value) {
            (CommandOptionType::Integer, Value::Number(n)) => {
                if let Some(val) = n.as_i64().and_then(|v| i32::try_from(v).ok()) {
                    o.add_int_choice(&choice.name, val);
                }
            }
            (CommandOptionType::Number, Value::Number(n)) => {
                if let Some(val) = n.as_f64() {
                    o.add_number_choice(&choice.name, val);
                }
            }
            (_, Value::String(s)) => {
                o.add_string_choice(&choice.name, s);
            }
            (_, other) => {
                o.add_string_choice(&choice.name, other.to_string());
            }
        }
    }

    o
}

/// Parse option type string to Discord CommandOptionType
pub fn parse_option_type(type_str: &str) -> CommandOptionType {
    match type_str.to_lowercase().as_str() {
        "string" => CommandOptionType::String,
        "integer" => CommandOptionType::Integer,
        "boolean" => CommandOptionType::Boolean,
        "user" => CommandOptionType::User,
        "channel" => CommandOptionType::Channel,
        "role" => CommandOptionType::Role,
        "mentionable" => CommandOptionType::Mentionable,
        "number" => CommandOptionType::Number,
        "attachment" => CommandOptionType::Attachment,
        _ => CommandOptionType::String,
    }
}
