//! Timestamped snapshots of the enabled-server set with bounded retention.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDateTime, Timelike};

use crate::config::LiveConfig;
use crate::config::managed_json;

/// Number of backups kept after each new backup.
pub const MAX_BACKUPS: usize = 10;

const BACKUP_PREFIX: &str = "mcp-servers-";
const BACKUP_SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";
const TIMESTAMP_LEN: usize = "YYYY-MM-DD-HHMMSS".len();

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Backup not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// A backup file, reconstructed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub filename: String,
    pub timestamp: NaiveDateTime,
    pub path: PathBuf,
}

pub fn backup_filename(timestamp: NaiveDateTime) -> String {
    format!(
        "{BACKUP_PREFIX}{}{BACKUP_SUFFIX}",
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Parse `mcp-servers-YYYY-MM-DD-HHMMSS.json`. Anything else is `None`.
pub fn parse_backup_filename(filename: &str) -> Option<NaiveDateTime> {
    let stamp = filename
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_SUFFIX)?;
    if stamp.len() != TIMESTAMP_LEN {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    max_backups: usize,
}

impl BackupManager {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            max_backups: MAX_BACKUPS,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot `config` now, then prune old backups.
    pub fn create(&self, config: &LiveConfig) -> anyhow::Result<BackupRecord> {
        self.create_at(config, Local::now().naive_local())
    }

    pub fn create_at(
        &self,
        config: &LiveConfig,
        timestamp: NaiveDateTime,
    ) -> anyhow::Result<BackupRecord> {
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        let filename = backup_filename(timestamp);
        let path = self.dir.join(&filename);
        managed_json::write_json(&path, &config.snapshot())
            .with_context(|| format!("Failed to create backup: {}", path.display()))?;
        tracing::info!(path = %path.display(), servers = config.servers.len(), "Created backup");

        // The backup exists at this point; cleanup problems must not fail it.
        if let Err(err) = self.prune() {
            tracing::warn!("Failed to clean up old backups: {err:#}");
        }

        Ok(BackupRecord {
            filename,
            timestamp,
            path,
        })
    }

    /// All parsable backups, newest first. A missing directory is empty.
    pub fn list(&self) -> anyhow::Result<Vec<BackupRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read backups directory: {}", self.dir.display()))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read backup entry")?;
            let filename = entry.file_name().to_string_lossy().to_string();
            let Some(timestamp) = parse_backup_filename(&filename) else {
                continue;
            };
            if !entry.path().is_file() {
                continue;
            }
            backups.push(BackupRecord {
                path: entry.path(),
                filename,
                timestamp,
            });
        }
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Delete every parsable backup beyond the newest `max_backups`.
    ///
    /// Files whose names do not match the backup pattern are never touched.
    pub fn prune(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for backup in self.list()?.into_iter().skip(self.max_backups) {
            match std::fs::remove_file(&backup.path) {
                Ok(()) => {
                    tracing::debug!(path = %backup.path.display(), "Removed old backup");
                    removed.push(backup.path);
                }
                Err(err) => {
                    tracing::warn!(
                        path = %backup.path.display(),
                        "Failed to remove old backup: {err}"
                    );
                }
            }
        }
        Ok(removed)
    }

    /// Read and validate a backup's server set.
    pub fn load(&self, backup: &BackupRecord) -> anyhow::Result<LiveConfig> {
        if !backup.path.is_file() {
            return Err(BackupError::NotFound(backup.path.clone()).into());
        }
        let document = managed_json::load_json(&backup.path)?;
        LiveConfig::from_value(document)
            .with_context(|| format!("Invalid backup: {}", backup.path.display()))
    }
}
