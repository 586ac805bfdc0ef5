//! # Plugin Toggle
//!
//! Per-guild enable/disable of a plugin. The only path that changes enablement.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//!
//! Enabling only publishes and disabling only purges, in both cases for the
//! guild that toggled.

use log::info;
use std::sync::Arc;

use super::publisher::{CommandPublisher, ReconcileReport};
use super::registry::CommandRegistry;
use crate::core::error::ToggleError;
use crate::core::events::{CoreEvent, EventBus};
use crate::guilds::GuildStore;
use crate::plugins::PluginRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Enable,
    Disable,
}

impl ToggleAction {
    /// Parse the `button` field of a toggle payload
    pub fn from_button(button: &str) -> Option<Self> {
        match button {
            "enable" => Some(ToggleAction::Enable),
            "disable" => Some(ToggleAction::Disable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleAction::Enable => "enable",
            ToggleAction::Disable => "disable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub state: PluginState,
    /// False when the plugin was already in the requested state
    pub changed: bool,
    pub report: ReconcileReport,
}

#[derive(Clone)]
pub struct PluginToggle {
    store: GuildStore,
    plugins: Arc<PluginRegistry>,
    commands: Arc<CommandRegistry>,
    publisher: CommandPublisher,
    events: EventBus,
}

impl PluginToggle {
    pub fn new(
        store: GuildStore,
        plugins: Arc<PluginRegistry>,
        commands: Arc<CommandRegistry>,
        publisher: CommandPublisher,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            plugins,
            commands,
            publisher,
            events,
        }
    }

    /// Switch a plugin on or off for a guild.
    ///
    /// Requires the administrator capability. Enabling an unknown plugin is an
    /// error; disabling one is allowed so stale names can be cleared.
    pub async fn apply(
        &self,
        guild_id: &str,
        plugin: &str,
        action: ToggleAction,
        is_admin: bool,
    ) -> Result<ToggleOutcome, ToggleError> {
        if !is_admin {
            return Err(ToggleError::PermissionDenied);
        }
        if action == ToggleAction::Enable && !self.plugins.contains(plugin) {
            return Err(ToggleError::UnknownPlugin(plugin.to_string()));
        }

        let enable = action == ToggleAction::Enable;
        let changed = self
            .store
            .set_plugin_enabled(guild_id, plugin, enable)
            .await?
            .ok_or_else(|| ToggleError::UnknownGuild(guild_id.to_string()))?;

        let outcome = if enable {
            let report = if changed {
                self.publisher
                    .publish_guild(&self.store, &self.commands, guild_id)
                    .await
            } else {
                ReconcileReport::default()
            };
            self.events.emit(CoreEvent::PluginEnabled {
                guild_id: guild_id.to_string(),
                plugin: plugin.to_string(),
            });
            ToggleOutcome {
                state: PluginState::Enabled,
                changed,
                report,
            }
        } else {
            let report = self
                .publisher
                .purge_guild(&self.store, &self.commands, guild_id)
                .await;
            self.events.emit(CoreEvent::PluginDisabled {
                guild_id: guild_id.to_string(),
                plugin: plugin.to_string(),
            });
            ToggleOutcome {
                state: PluginState::Disabled,
                changed,
                report,
            }
        };

        info!(
            "Plugin {} {}d for guild {} (changed: {})",
            plugin,
            action.as_str(),
            guild_id,
            outcome.changed
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::publisher::RetryPolicy;
    use crate::testing::{self, InMemoryCommandApi};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: GuildStore,
        api: Arc<InMemoryCommandApi>,
        events: EventBus,
        toggle: PluginToggle,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = GuildStore::load(dir.path().join("database.json")).await.unwrap();
        store.observe("G1", "Camel Club").await.unwrap();

        let mut commands = CommandRegistry::with_core_commands();
        let plugins = PluginRegistry::assemble(vec![testing::weather_plugin()], &mut commands);
        let commands = Arc::new(commands);

        let api = Arc::new(InMemoryCommandApi::with_guilds(&["G1"]));
        let events = EventBus::new();
        let policy = RetryPolicy {
            timeout: Duration::from_secs(1),
            max_attempts: 1,
            initial_backoff: Duration::from_millis(1),
        };
        let publisher = CommandPublisher::new(api.clone(), events.clone(), policy);
        publisher.reconcile(&store, &commands).await;

        let toggle = PluginToggle::new(
            store.clone(),
            Arc::new(plugins),
            commands,
            publisher,
            events.clone(),
        );
        Fixture {
            _dir: dir,
            store,
            api,
            events,
            toggle,
        }
    }

    #[tokio::test]
    async fn test_enable_then_disable_scenario() {
        let f = fixture().await;
        assert_eq!(f.api.names("G1"), vec!["help", "plugins"]);

        let outcome = f
            .toggle
            .apply("G1", "weather", ToggleAction::Enable, true)
            .await
            .unwrap();
        assert_eq!(outcome.state, PluginState::Enabled);
        assert!(outcome.changed);
        assert_eq!(outcome.report.created, 1);
        assert_eq!(f.api.names("G1"), vec!["forecast", "help", "plugins"]);
        assert!(f.store.is_enabled("G1", "weather").await);

        let outcome = f
            .toggle
            .apply("G1", "weather", ToggleAction::Disable, true)
            .await
            .unwrap();
        assert_eq!(outcome.state, PluginState::Disabled);
        assert_eq!(outcome.report.deleted, 1);
        assert_eq!(f.api.names("G1"), vec!["help", "plugins"]);
        assert!(!f.store.is_enabled("G1", "weather").await);
    }

    #[tokio::test]
    async fn test_non_admin_is_denied_without_state_change() {
        let f = fixture().await;

        let result = f.toggle.apply("G1", "weather", ToggleAction::Enable, false).await;

        assert!(matches!(result, Err(ToggleError::PermissionDenied)));
        assert!(!f.store.is_enabled("G1", "weather").await);
        assert_eq!(f.api.names("G1"), vec!["help", "plugins"]);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_disable() {
        let f = fixture().await;
        f.toggle
            .apply("G1", "weather", ToggleAction::Enable, true)
            .await
            .unwrap();

        let result = f.toggle.apply("G1", "weather", ToggleAction::Disable, false).await;

        assert!(matches!(result, Err(ToggleError::PermissionDenied)));
        assert!(f.store.is_enabled("G1", "weather").await);
    }

    #[tokio::test]
    async fn test_enabling_twice_does_not_republish() {
        let f = fixture().await;
        f.toggle
            .apply("G1", "weather", ToggleAction::Enable, true)
            .await
            .unwrap();
        let fetches = f.api.fetches();

        let outcome = f
            .toggle
            .apply("G1", "weather", ToggleAction::Enable, true)
            .await
            .unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.state, PluginState::Enabled);
        assert_eq!(f.api.fetches(), fetches);
    }

    #[tokio::test]
    async fn test_unknown_plugin_and_guild() {
        let f = fixture().await;

        assert!(matches!(
            f.toggle.apply("G1", "radar", ToggleAction::Enable, true).await,
            Err(ToggleError::UnknownPlugin(name)) if name == "radar"
        ));
        assert!(matches!(
            f.toggle.apply("G9", "weather", ToggleAction::Enable, true).await,
            Err(ToggleError::UnknownGuild(id)) if id == "G9"
        ));
    }

    #[tokio::test]
    async fn test_toggle_emits_events() {
        let f = fixture().await;
        let mut rx = f.events.subscribe();

        f.toggle
            .apply("G1", "weather", ToggleAction::Enable, true)
            .await
            .unwrap();
        f.toggle
            .apply("G1", "weather", ToggleAction::Disable, true)
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&CoreEvent::PluginEnabled {
            guild_id: "G1".to_string(),
            plugin: "weather".to_string()
        }));
        assert!(events.contains(&CoreEvent::PluginDisabled {
            guild_id: "G1".to_string(),
            plugin: "weather".to_string()
        }));
    }

    #[tokio::test]
    async fn test_store_failure_keeps_plugin_disabled() {
        let f = fixture().await;
        std::fs::create_dir_all(f.store.path().with_extension("json.tmp")).unwrap();

        let result = f.toggle.apply("G1", "weather", ToggleAction::Enable, true).await;

        assert!(matches!(result, Err(ToggleError::Store(_))));
        assert!(!f.store.is_enabled("G1", "weather").await);
        assert_eq!(f.api.names("G1"), vec!["help", "plugins"]);
    }

    #[test]
    fn test_action_from_button() {
        assert_eq!(ToggleAction::from_button("enable"), Some(ToggleAction::Enable));
        assert_eq!(ToggleAction::from_button("disable"), Some(ToggleAction::Disable));
        assert_eq!(ToggleAction::from_button("explode"), None);
    }
}
