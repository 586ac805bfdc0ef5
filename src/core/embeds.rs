//! Embed and component builders for the core commands
//!
//! - **Version**: 2.0.0
//! - **Since**: 4.5.0
//!
//! ## Changelog
//! - 2.0.0: Plugin listing, plugin detail, toggle confirmation and help embeds
//! - 1.0.0: Extracted from duplicate implementations across command handlers

use rand::Rng;
use serenity::builder::{CreateComponents, CreateEmbed};
use serenity::model::application::component::ButtonStyle;
use serenity::model::Timestamp;
use std::sync::Arc;

use crate::commands::payload::ComponentPayload;
use crate::commands::registry::{CommandDescriptor, CoreCommand};
use crate::core::response::{menu_preview, truncate_for_embed, truncate_for_field};
use crate::plugins::PluginDescriptor;

pub const COLOR_ENABLED: u32 = 0x008000;
pub const COLOR_DISABLED: u32 = 0x340034;
pub const COLOR_ERROR: u32 = 0xFF0000;

/// Discord caps select menus at 25 options
const MENU_OPTION_LIMIT: usize = 25;

/// `type` of the plugin picker's payload
pub const PLUGIN_MENU_KIND: &str = "selecter";

/// Random 24-bit colour
pub fn random_color() -> u32 {
    rand::rng().random_range(0..=0xFF_FFFF)
}

/// Header embed for the `plugins` command
pub fn plugins_overview_embed(color: u32) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.title("**__Plugins__**");
    embed.field(
        "Installed plugins",
        "Select the plugin you want to get more information and configure.",
        false,
    );
    embed.color(color);
    embed
}

/// Select menu listing every loaded plugin
///
/// Returns `None` when there are no plugins, since an empty menu is rejected.
pub fn plugin_menu(plugins: &[Arc<PluginDescriptor>]) -> Option<CreateComponents> {
    if plugins.is_empty() {
        return None;
    }

    let custom_id = ComponentPayload::new(CoreCommand::Plugins.name())
        .with_kind(PLUGIN_MENU_KIND)
        .encode();

    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        row.create_select_menu(|menu| {
            menu.custom_id(custom_id)
                .placeholder("No plugin selected")
                .min_values(0)
                .max_values(1)
                .options(|opts| {
                    for plugin in plugins.iter().take(MENU_OPTION_LIMIT) {
                        opts.create_option(|opt| {
                            opt.label(&plugin.name)
                                .description(menu_preview(&plugin.description))
                                .value(&plugin.name)
                        });
                    }
                    opts
                })
        })
    });
    Some(components)
}

/// Detail embed for one plugin
pub fn plugin_detail_embed(plugin: &PluginDescriptor, color: u32) -> CreateEmbed {
    let description = if plugin.description.is_empty() {
        "No description".to_string()
    } else {
        truncate_for_field(&plugin.description)
    };

    let mut embed = CreateEmbed::default();
    embed.title(format!("__{}__", plugin.name));
    embed.field("Description", description, false);
    if !plugin.commands.is_empty() {
        let names: Vec<String> = plugin.commands.iter().map(|c| format!("`/{}`", c.name)).collect();
        embed.field("Commands", truncate_for_field(&names.join(" ")), false);
    }
    embed.color(color);
    embed
}

/// Custom id of a plugin's enable or disable button
pub fn toggle_custom_id(plugin: &str, action: &str) -> String {
    ComponentPayload::new(CoreCommand::Plugins.name())
        .with_plugin(plugin)
        .with_button(action)
        .encode()
}

/// Single enable or disable button for a plugin, depending on its current state
pub fn toggle_button(plugin: &str, enabled: bool) -> CreateComponents {
    let (action, style) = if enabled {
        ("disable", ButtonStyle::Danger)
    } else {
        ("enable", ButtonStyle::Primary)
    };
    let custom_id = toggle_custom_id(plugin, action);

    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        row.create_button(|btn| btn.custom_id(custom_id).label(action).style(style))
    });
    components
}

pub fn plugin_enabled_embed(plugin: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(COLOR_ENABLED);
    embed.title(format!("{} enabled", plugin));
    embed.field(
        "Success",
        "All commands and features are now active in your server",
        false,
    );
    embed.timestamp(Timestamp::now());
    embed
}

pub fn plugin_disabled_embed(plugin: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(COLOR_DISABLED);
    embed.title(format!("{} disabled", plugin));
    embed.field(
        "Success",
        "All commands and features are now disabled for your Discord Server",
        false,
    );
    embed.timestamp(Timestamp::now());
    embed
}

pub fn permission_denied_embed() -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.title("Error");
    embed.color(COLOR_ERROR);
    embed.field(
        "Permission",
        "You do not have permission to edit the server's plugins",
        false,
    );
    embed.timestamp(Timestamp::now());
    embed
}

/// Embed listing the commands a guild can use
pub fn help_embed(commands: &[Arc<CommandDescriptor>], color: u32) -> CreateEmbed {
    let lines: Vec<String> = commands
        .iter()
        .map(|c| format!("`/{}` - {}", c.name, c.description))
        .collect();

    let mut embed = CreateEmbed::default();
    embed.title("**__Commands__**");
    embed.description(truncate_for_embed(&lines.join("\n")));
    embed.color(color);
    embed
}
