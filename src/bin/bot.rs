use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::http::Http;
use serenity::prelude::*;
use std::sync::Arc;

use camelbot::commands::{CommandPublisher, CommandRegistry, CoreCommands, PluginToggle};
use camelbot::core::{Config, CoreEvent, CoreServices, EventBus};
use camelbot::discord::{DiscordCommandApi, Handler};
use camelbot::guilds::GuildStore;
use camelbot::plugins::{HandlerTable, PluginLoader, PluginRegistry};
use camelbot::router::InteractionRouter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting CamelBot...");

    let store = GuildStore::load(&config.guild_database_path).await?;
    let events = EventBus::new();
    let services = CoreServices::new(store.clone(), events.clone());

    // Discover plugins, then fold their commands into the registry
    let loader = PluginLoader::new(&config.plugins_dir, HandlerTable::with_builtins(), services);
    let descriptors = loader.load()?;
    let mut commands = CommandRegistry::with_core_commands();
    let plugins = Arc::new(PluginRegistry::assemble(descriptors, &mut commands));
    let commands = Arc::new(commands);
    info!(
        "{} plugins loaded, {} commands registered",
        plugins.len(),
        commands.len()
    );
    events.emit(CoreEvent::PluginsLoaded {
        count: plugins.len(),
    });

    // Guild commands are published with our own HTTP client, so resolve the
    // application id up front
    let http = Arc::new(Http::new(&config.discord_token));
    let application = http.get_current_application_info().await.map_err(|e| {
        error!("Failed to fetch application info: {e}");
        error!("This could indicate an invalid bot token");
        anyhow::anyhow!("Application lookup failed: {}", e)
    })?;
    http.set_application_id(application.id.0);

    let api = Arc::new(DiscordCommandApi::new(http));
    let publisher = CommandPublisher::new(api, events.clone(), config.retry_policy());
    let toggle = PluginToggle::new(
        store.clone(),
        plugins.clone(),
        commands.clone(),
        publisher.clone(),
        events.clone(),
    );
    let core = CoreCommands::new(store.clone(), plugins, commands.clone(), toggle);
    let router = InteractionRouter::new(commands.clone(), store.clone(), core);
    let handler = Handler::new(store, commands, publisher, router);

    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .application_id(application.id.0)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
