//! Test doubles shared by unit tests

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

use crate::commands::api::{CommandApi, RemoteCommand};
use crate::commands::payload::ComponentPayload;
use crate::commands::registry::{CommandDescriptor, CommandOwner, CommandTarget};
use crate::commands::request::{
    CommandArgument, CommandRequest, ComponentKind, ComponentRequest, Origin, Reply, Responder,
};
use crate::core::events::EventBus;
use crate::core::services::CoreServices;
use crate::guilds::GuildStore;
use crate::plugins::handler::{PluginContext, PluginHandler};
use crate::plugins::manifest::Interface;
use crate::plugins::PluginDescriptor;

pub const WEATHER_MANIFEST: &str = r#"{
    "name": "weather",
    "description": "Forecasts and current conditions for any city in the world",
    "class": "weather",
    "commands": [
        {
            "name": "forecast",
            "description": "Get the forecast",
            "method": "forecast",
            "options": [{"name": "city", "description": "City name", "required": true}]
        }
    ]
}"#;

/// Services backed by a guild store in a fresh temp directory
pub async fn temp_services() -> (TempDir, CoreServices) {
    let dir = TempDir::new().unwrap();
    let store = GuildStore::load(dir.path().join("database.json")).await.unwrap();
    (dir, CoreServices::new(store, EventBus::new()))
}

/// Records everything sent through it
#[derive(Default)]
pub struct RecordingResponder {
    replies: Mutex<Vec<Reply>>,
    sent: Mutex<Vec<Reply>>,
    deletions: AtomicUsize,
}

impl RecordingResponder {
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Reply> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> usize {
        self.deletions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }

    async fn send(&self, reply: Reply) -> Result<()> {
        self.sent.lock().unwrap().push(reply);
        Ok(())
    }

    async fn delete_origin(&self) -> Result<()> {
        self.deletions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn origin(guild_id: &str, is_admin: bool) -> (Origin, Arc<RecordingResponder>) {
    let responder = Arc::new(RecordingResponder::default());
    let origin = Origin {
        source: Interface::Discord,
        request_id: Uuid::new_v4(),
        guild_id: Some(guild_id.to_string()),
        channel_id: "500".to_string(),
        user_id: "42".to_string(),
        is_admin,
        responder: responder.clone(),
    };
    (origin, responder)
}

pub fn command_request(
    command: &str,
    arguments: Vec<CommandArgument>,
    guild_id: &str,
    is_admin: bool,
) -> (CommandRequest, Arc<RecordingResponder>) {
    let (origin, responder) = origin(guild_id, is_admin);
    let request = CommandRequest {
        origin,
        command: command.to_string(),
        arguments,
    };
    (request, responder)
}

pub fn component_request(
    kind: ComponentKind,
    payload: ComponentPayload,
    values: Vec<String>,
    guild_id: &str,
    is_admin: bool,
) -> (ComponentRequest, Arc<RecordingResponder>) {
    let (origin, responder) = origin(guild_id, is_admin);
    let request = ComponentRequest {
        origin,
        kind,
        payload,
        values,
    };
    (request, responder)
}

/// Weather plugin that records what it was asked to do
#[derive(Default)]
pub struct Weather {
    pub invocations: Mutex<Vec<(String, String)>>,
    pub components: Mutex<Vec<ComponentPayload>>,
}

#[async_trait]
impl PluginHandler for Weather {
    fn methods(&self) -> &'static [&'static str] {
        &["forecast"]
    }

    async fn invoke(&self, method: &str, request: CommandRequest) -> Result<()> {
        self.invocations
            .lock()
            .unwrap()
            .push((method.to_string(), request.command.clone()));
        request.origin.reply(Reply::text("sunny")).await
    }

    async fn handle_component(&self, request: ComponentRequest) -> Result<()> {
        self.components.lock().unwrap().push(request.payload);
        Ok(())
    }
}

pub fn construct_weather(_ctx: PluginContext) -> Result<Arc<dyn PluginHandler>> {
    Ok(Arc::new(Weather::default()))
}

pub fn construct_broken(_ctx: PluginContext) -> Result<Arc<dyn PluginHandler>> {
    Err(anyhow!("missing API key"))
}

struct Noop;

#[async_trait]
impl PluginHandler for Noop {
    fn methods(&self) -> &'static [&'static str] {
        &[]
    }

    async fn invoke(&self, _method: &str, _request: CommandRequest) -> Result<()> {
        Ok(())
    }
}

pub fn noop_handler() -> Arc<dyn PluginHandler> {
    Arc::new(Noop)
}

fn plugin_from(
    name: &str,
    description: &str,
    handler: Arc<dyn PluginHandler>,
    commands: &[&str],
) -> PluginDescriptor {
    let commands = commands
        .iter()
        .map(|command| {
            Arc::new(CommandDescriptor {
                name: command.to_string(),
                description: format!("{} from {}", command, name),
                options: Vec::new(),
                owner: CommandOwner::Plugin(name.to_string()),
                sources: vec![Interface::Discord],
                target: CommandTarget::Plugin {
                    handler: Arc::clone(&handler),
                    method: command.to_string(),
                },
            })
        })
        .collect();
    PluginDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        handler,
        commands,
    }
}

/// The `weather` plugin with its `forecast` command
pub fn weather_plugin() -> PluginDescriptor {
    weather_plugin_with(Arc::new(Weather::default()))
}

/// The `weather` plugin backed by a handler the test keeps a reference to
pub fn weather_plugin_with(handler: Arc<Weather>) -> PluginDescriptor {
    plugin_from(
        "weather",
        "Forecasts and current conditions for any city in the world",
        handler,
        &["forecast"],
    )
}

pub fn plugin_with_commands(name: &str, commands: &[&str]) -> PluginDescriptor {
    plugin_from(name, "", noop_handler(), commands)
}

/// In-memory remote command API
///
/// Guilds must be added before use; calls for unknown guilds fail like the
/// real API does.
#[derive(Default)]
pub struct InMemoryCommandApi {
    guilds: Mutex<HashMap<String, Vec<RemoteCommand>>>,
    failing: Mutex<HashSet<String>>,
    unaddressable: Mutex<HashSet<String>>,
    fail_next: AtomicUsize,
    next_id: AtomicU64,
    creates: AtomicUsize,
    deletes: AtomicUsize,
    fetches: AtomicUsize,
}

impl InMemoryCommandApi {
    pub fn with_guilds(ids: &[&str]) -> Self {
        let api = Self::default();
        {
            let mut guilds = api.guilds.lock().unwrap();
            for id in ids {
                guilds.insert(id.to_string(), Vec::new());
            }
        }
        api
    }

    /// Pre-register a command, as if left over from an earlier run
    pub fn seed(&self, guild_id: &str, name: &str) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.guilds
            .lock()
            .unwrap()
            .entry(guild_id.to_string())
            .or_default()
            .push(RemoteCommand {
                id,
                name: name.to_string(),
            });
    }

    /// Every call touching this guild fails
    pub fn fail_guild(&self, guild_id: &str) {
        self.failing.lock().unwrap().insert(guild_id.to_string());
    }

    /// The guild id is rejected up front, as a malformed id would be
    pub fn reject_guild(&self, guild_id: &str) {
        self.unaddressable.lock().unwrap().insert(guild_id.to_string());
    }

    /// The next `n` calls fail, whichever guild they are for
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn names(&self, guild_id: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .guilds
            .lock()
            .unwrap()
            .get(guild_id)
            .map(|cmds| cmds.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self, guild_id: &str) -> Result<()> {
        let pending = self.fail_next.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next.store(pending - 1, Ordering::SeqCst);
            bail!("injected failure");
        }
        if self.failing.lock().unwrap().contains(guild_id) {
            bail!("guild {} unavailable", guild_id);
        }
        if !self.guilds.lock().unwrap().contains_key(guild_id) {
            bail!("Unknown Guild {}", guild_id);
        }
        Ok(())
    }
}

#[async_trait]
impl CommandApi for InMemoryCommandApi {
    fn validate_guild(&self, guild_id: &str) -> Result<()> {
        if self.unaddressable.lock().unwrap().contains(guild_id) {
            bail!("'{}' is not a guild id", guild_id);
        }
        Ok(())
    }

    async fn fetch(&self, guild_id: &str) -> Result<Vec<RemoteCommand>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check(guild_id)?;
        Ok(self.guilds.lock().unwrap()[guild_id].clone())
    }

    async fn create(&self, guild_id: &str, command: &CommandDescriptor) -> Result<RemoteCommand> {
        self.check(guild_id)?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        let remote = RemoteCommand {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: command.name.clone(),
        };
        let mut guilds = self.guilds.lock().unwrap();
        let commands = guilds.get_mut(guild_id).unwrap();
        // The real API upserts by name
        commands.retain(|c| c.name != remote.name);
        commands.push(remote.clone());
        Ok(remote)
    }

    async fn delete(&self, guild_id: &str, command: &RemoteCommand) -> Result<()> {
        self.check(guild_id)?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut guilds = self.guilds.lock().unwrap();
        guilds.get_mut(guild_id).unwrap().retain(|c| c.id != command.id);
        Ok(())
    }
}
