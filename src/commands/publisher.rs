//! # Command Publisher
//!
//! Reconciles each guild's remote slash commands with the command registry and
//! the guild's enabled plugins.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: false
//!
//! `publish` only creates and `purge` only deletes. Startup runs purge then
//! publish. Each guild is reconciled independently: a remote failure (after
//! retries) skips that guild for the pass and the rest carry on.

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::api::{CommandApi, RemoteCommand};
use super::registry::{CommandDescriptor, CommandOwner, CommandRegistry};
use crate::core::events::{CoreEvent, EventBus};
use crate::guilds::{GuildRecord, GuildStore};

/// Timeout and retry settings for each remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled after each further failure
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// What a reconciliation pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub deleted: usize,
    /// Guilds skipped because a remote call kept failing
    pub failed_guilds: Vec<String>,
}

impl ReconcileReport {
    pub fn merge(&mut self, other: ReconcileReport) {
        self.created += other.created;
        self.deleted += other.deleted;
        for guild in other.failed_guilds {
            self.fail(guild);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed_guilds.is_empty()
    }

    fn fail(&mut self, guild_id: String) {
        if !self.failed_guilds.contains(&guild_id) {
            self.failed_guilds.push(guild_id);
        }
    }
}

/// Whether a command belongs in a guild: core, or owned by an enabled plugin
pub fn is_active(command: &CommandDescriptor, record: &GuildRecord) -> bool {
    match &command.owner {
        CommandOwner::Core => true,
        CommandOwner::Plugin(plugin) => record.is_enabled(plugin),
    }
}

#[derive(Clone)]
pub struct CommandPublisher {
    api: Arc<dyn CommandApi>,
    events: EventBus,
    policy: RetryPolicy,
}

impl CommandPublisher {
    pub fn new(api: Arc<dyn CommandApi>, events: EventBus, policy: RetryPolicy) -> Self {
        Self {
            api,
            events,
            policy,
        }
    }

    /// Purge then publish for every guild
    pub async fn reconcile(&self, store: &GuildStore, registry: &CommandRegistry) -> ReconcileReport {
        let mut report = self.purge(store, registry).await;
        report.merge(self.publish(store, registry).await);
        info!(
            "Reconciled {} guild(s): {} created, {} deleted, {} failed",
            store.len().await,
            report.created,
            report.deleted,
            report.failed_guilds.len()
        );
        report
    }

    /// Create missing active slash commands in every guild
    pub async fn publish(&self, store: &GuildStore, registry: &CommandRegistry) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for record in store.records().await {
            self.publish_record(&record, registry, &mut report).await;
        }
        report
    }

    /// Delete remote commands that are no longer active in every guild
    pub async fn purge(&self, store: &GuildStore, registry: &CommandRegistry) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for record in store.records().await {
            self.purge_record(&record, registry, &mut report).await;
        }
        report
    }

    /// `publish` restricted to one guild
    pub async fn publish_guild(
        &self,
        store: &GuildStore,
        registry: &CommandRegistry,
        guild_id: &str,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        match store.get(guild_id).await {
            Some(record) => self.publish_record(&record, registry, &mut report).await,
            None => warn!("Cannot publish for unknown guild {}", guild_id),
        }
        report
    }

    /// `purge` restricted to one guild
    pub async fn purge_guild(
        &self,
        store: &GuildStore,
        registry: &CommandRegistry,
        guild_id: &str,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        match store.get(guild_id).await {
            Some(record) => self.purge_record(&record, registry, &mut report).await,
            None => warn!("Cannot purge for unknown guild {}", guild_id),
        }
        report
    }

    async fn publish_record(
        &self,
        record: &GuildRecord,
        registry: &CommandRegistry,
        report: &mut ReconcileReport,
    ) {
        let guild_id = record.id.as_str();
        let wanted: Vec<&Arc<CommandDescriptor>> = registry
            .all()
            .iter()
            .filter(|c| c.on_discord() && is_active(c, record))
            .collect();

        let Some(remote) = self.fetch(record, report).await else {
            return;
        };

        for command in wanted {
            if remote.iter().any(|r| r.name == command.name) {
                continue;
            }
            match self
                .attempt(guild_id, "create command", || self.api.create(guild_id, command))
                .await
            {
                Ok(created) => {
                    info!("Created /{} in {} ({})", created.name, record.name, guild_id);
                    self.events.emit(CoreEvent::CommandCreated {
                        guild_id: guild_id.to_string(),
                        name: created.name,
                    });
                    report.created += 1;
                }
                Err(e) => {
                    error!("Skipping guild {} for this pass: {:#}", guild_id, e);
                    report.fail(guild_id.to_string());
                    return;
                }
            }
        }
    }

    async fn purge_record(
        &self,
        record: &GuildRecord,
        registry: &CommandRegistry,
        report: &mut ReconcileReport,
    ) {
        let guild_id = record.id.as_str();
        let Some(remote) = self.fetch(record, report).await else {
            return;
        };

        for command in remote {
            let keep = registry
                .lookup(&command.name)
                .is_some_and(|c| is_active(&c, record));
            if keep {
                continue;
            }
            match self
                .attempt(guild_id, "delete command", || self.api.delete(guild_id, &command))
                .await
            {
                Ok(()) => {
                    info!("Deleted /{} from {} ({})", command.name, record.name, guild_id);
                    self.events.emit(CoreEvent::CommandDeleted {
                        guild_id: guild_id.to_string(),
                        name: command.name,
                    });
                    report.deleted += 1;
                }
                Err(e) => {
                    error!("Skipping guild {} for this pass: {:#}", guild_id, e);
                    report.fail(guild_id.to_string());
                    return;
                }
            }
        }
    }

    async fn fetch(&self, record: &GuildRecord, report: &mut ReconcileReport) -> Option<Vec<RemoteCommand>> {
        let guild_id = record.id.as_str();
        if let Err(e) = self.api.validate_guild(guild_id) {
            error!("Skipping guild {} for this pass: {:#}", guild_id, e);
            report.fail(guild_id.to_string());
            return None;
        }
        match self
            .attempt(guild_id, "fetch commands", || self.api.fetch(guild_id))
            .await
        {
            Ok(remote) => {
                debug!("Guild {} has {} remote command(s)", guild_id, remote.len());
                Some(remote)
            }
            Err(e) => {
                error!("Skipping guild {} for this pass: {:#}", guild_id, e);
                report.fail(guild_id.to_string());
                None
            }
        }
    }

    /// Run a remote call under the timeout, retrying with exponential backoff
    async fn attempt<T, F, Fut>(&self, guild_id: &str, what: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 1;

        loop {
            let err = match tokio::time::timeout(self.policy.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => anyhow!("timed out after {:?}", self.policy.timeout),
            };

            if attempt >= max_attempts {
                return Err(err.context(format!(
                    "{} for guild {} failed after {} attempt(s)",
                    what, guild_id, attempt
                )));
            }

            warn!(
                "{} for guild {} failed (attempt {}/{}): {:#}, retrying in {:?}",
                what, guild_id, attempt, max_attempts, err, backoff
            );
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
            attempt += 1;
        }
    }
}
