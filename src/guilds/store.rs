//! # Persisted Guild Store
//!
//! Durable guild id -> record mapping, kept as a tab-indented JSON array and
//! rewritten wholesale on every mutation.
//!
//! - **Version**: 1.0.0
//! - **Since**: 5.0.0
//! - **Toggleable**: false

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::record::GuildRecord;

/// Shared handle to the guild store.
///
/// Every mutation takes the write lock, applies the change and persists before
/// releasing it, so writes are serialized even on the multi-threaded runtime.
#[derive(Clone)]
pub struct GuildStore {
    path: Arc<PathBuf>,
    records: Arc<RwLock<Vec<GuildRecord>>>,
}

impl GuildStore {
    /// Load the store from `path`, creating an empty one if the file is missing.
    ///
    /// The file is rewritten right after loading, which normalizes formatting and
    /// drops duplicate ids (first occurrence wins).
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let parsed: Vec<GuildRecord> = serde_json::from_str(&contents)
                    .with_context(|| format!("Guild store {} is not valid JSON", path.display()))?;
                dedupe(parsed)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No guild store at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        info!("Loaded {} guild records from {}", records.len(), path.display());
        write_records(&path, &records).await?;

        Ok(Self {
            path: Arc::new(path),
            records: Arc::new(RwLock::new(records)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the current records
    pub async fn save(&self) -> Result<()> {
        let records = self.records.read().await;
        write_records(&self.path, &records).await
    }

    /// Snapshot of all records, in first-observation order
    pub async fn records(&self) -> Vec<GuildRecord> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, guild_id: &str) -> Option<GuildRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == guild_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Whether `plugin` is enabled for `guild_id` (false for unknown guilds)
    pub async fn is_enabled(&self, guild_id: &str, plugin: &str) -> bool {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == guild_id)
            .is_some_and(|r| r.is_enabled(plugin))
    }

    /// Record a guild the bot can see: create it if new, refresh its name otherwise.
    ///
    /// Returns true if the guild was new.
    pub async fn observe(&self, guild_id: &str, name: &str) -> Result<bool> {
        let created = self.observe_all([(guild_id.to_string(), name.to_string())]).await?;
        Ok(created == 1)
    }

    /// Observe many guilds with a single write. Returns how many were new.
    pub async fn observe_all<I>(&self, guilds: I) -> Result<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut records = self.records.write().await;
        let mut staged = records.clone();
        let mut created = 0;
        let mut changed = false;

        for (id, name) in guilds {
            match staged.iter_mut().find(|r| r.id == id) {
                Some(record) => {
                    if record.name != name {
                        debug!("Guild {id} renamed from '{}' to '{name}'", record.name);
                        record.name = name;
                        changed = true;
                    }
                }
                None => {
                    info!("New guild observed: {name} ({id})");
                    staged.push(GuildRecord::new(id, name));
                    created += 1;
                    changed = true;
                }
            }
        }

        if changed {
            self.commit(&mut records, staged).await?;
        }
        Ok(created)
    }

    /// Update a known guild's name. Returns false if the guild is unknown.
    pub async fn rename(&self, guild_id: &str, name: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let mut staged = records.clone();
        let Some(record) = staged.iter_mut().find(|r| r.id == guild_id) else {
            warn!("Rename for unknown guild {guild_id} ignored");
            return Ok(false);
        };
        if record.name == name {
            return Ok(true);
        }
        record.name = name.to_string();
        self.commit(&mut records, staged).await?;
        Ok(true)
    }

    /// Forget a guild (the bot was removed from it)
    pub async fn remove(&self, guild_id: &str) -> Result<Option<GuildRecord>> {
        let mut records = self.records.write().await;
        let Some(index) = records.iter().position(|r| r.id == guild_id) else {
            return Ok(None);
        };
        let mut staged = records.clone();
        let removed = staged.remove(index);
        self.commit(&mut records, staged).await?;
        info!("Removed guild {} ({})", removed.name, removed.id);
        Ok(Some(removed))
    }

    /// Set a plugin's enablement for a guild.
    ///
    /// Returns `None` if the guild is unknown, otherwise whether anything changed.
    /// The file is only rewritten when something changed.
    pub async fn set_plugin_enabled(
        &self,
        guild_id: &str,
        plugin: &str,
        enabled: bool,
    ) -> Result<Option<bool>> {
        let mut records = self.records.write().await;
        let mut staged = records.clone();
        let Some(record) = staged.iter_mut().find(|r| r.id == guild_id) else {
            return Ok(None);
        };

        let changed = if enabled {
            record.enable(plugin)
        } else {
            record.disable(plugin)
        };

        if changed {
            self.commit(&mut records, staged).await?;
        }
        Ok(Some(changed))
    }

    /// Persist `staged`, then make it the live state.
    ///
    /// On a failed write the live records are left untouched, so memory never
    /// runs ahead of the file.
    async fn commit(&self, records: &mut Vec<GuildRecord>, staged: Vec<GuildRecord>) -> Result<()> {
        write_records(&self.path, &staged).await?;
        *records = staged;
        Ok(())
    }
}

fn dedupe(records: Vec<GuildRecord>) -> Vec<GuildRecord> {
    let mut unique: Vec<GuildRecord> = Vec::with_capacity(records.len());
    for record in records {
        if unique.iter().any(|r| r.id == record.id) {
            warn!("Duplicate guild record {} dropped", record.id);
            continue;
        }
        unique.push(record);
    }
    unique
}

fn encode(records: &[GuildRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write the full record list via a temp file + rename
async fn write_records(path: &Path, records: &[GuildRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, encode(records)?)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!("Saved {} guild records to {}", records.len(), path.display());
    Ok(())
}
