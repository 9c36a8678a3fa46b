//! Named, explicitly saved snapshots of the enabled-server set.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::config::managed_json;
use crate::config::{LiveConfig, MCP_SERVERS_KEY};

const PROFILE_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },
    #[error("No MCP servers configured to save")]
    Empty,
    #[error("Invalid profile name: '{0}'")]
    InvalidName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub path: PathBuf,
    pub server_count: usize,
}

/// Turn a user-supplied profile name into a safe file stem.
///
/// A trailing `.json` is dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, and leading dots are stripped so profiles never become hidden files.
pub fn sanitize_profile_name(name: &str) -> Result<String, ProfileError> {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(".json")
        .unwrap_or(trimmed);
    let sanitized: String = stem
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.').to_string();
    if sanitized.is_empty() || sanitized.chars().all(|ch| ch == '_') {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(sanitized)
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, ProfileError> {
        let stem = sanitize_profile_name(name)?;
        Ok(self.dir.join(format!("{stem}.{PROFILE_EXTENSION}")))
    }

    /// Save the enabled servers of `config` under `name`.
    pub fn save(&self, name: &str, config: &LiveConfig) -> anyhow::Result<ProfileInfo> {
        if config.is_empty() {
            return Err(ProfileError::Empty.into());
        }
        let path = self.path_for(name)?;
        managed_json::write_json(&path, &config.snapshot())
            .with_context(|| format!("Failed to save profile '{name}'"))?;
        tracing::info!(path = %path.display(), servers = config.servers.len(), "Saved profile");
        Ok(ProfileInfo {
            name: sanitize_profile_name(name)?,
            path,
            server_count: config.servers.len(),
        })
    }

    /// Load a profile. Both `{"mcpServers": {...}}` and a bare name map
    /// are accepted.
    pub fn load(&self, name: &str) -> anyhow::Result<LiveConfig> {
        let path = self.existing_path(name)?;
        if !path.is_file() {
            return Err(ProfileError::NotFound {
                name: name.to_string(),
                path,
            }
            .into());
        }
        let document = managed_json::load_json(&path)?;
        LiveConfig::from_value(wrap_servers(document))
            .with_context(|| format!("Invalid profile '{name}': {}", path.display()))
    }

    /// Path of the profile `name`. A hand-placed file whose stem is not a
    /// sanitized name (as reported by [`ProfileStore::list`]) is matched
    /// verbatim first.
    fn existing_path(&self, name: &str) -> Result<PathBuf, ProfileError> {
        let plain_stem =
            !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\']);
        if plain_stem {
            let exact = self.dir.join(format!("{name}.{PROFILE_EXTENSION}"));
            if exact.is_file() {
                return Ok(exact);
            }
        }
        self.path_for(name)
    }

    /// Profiles on disk, sorted by name. Unparsable files are skipped.
    pub fn list(&self) -> anyhow::Result<Vec<ProfileInfo>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read profiles directory: {}", self.dir.display()))?;

        let mut profiles = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(PROFILE_EXTENSION)
            {
                continue;
            }
            let Some(name) = path.file_stem().map(|stem| stem.to_string_lossy().to_string())
            else {
                continue;
            };
            match count_servers(&path) {
                Some(server_count) => profiles.push(ProfileInfo {
                    name,
                    path,
                    server_count,
                }),
                None => tracing::debug!(path = %path.display(), "Skipping unparsable profile"),
            }
        }
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }
}

/// Wrap a bare `name -> entry` map as `{"mcpServers": ...}`.
fn wrap_servers(document: Value) -> Value {
    let has_servers_key = document
        .get(MCP_SERVERS_KEY)
        .is_some_and(|servers| !servers.is_null());
    if has_servers_key {
        return document;
    }
    let mut wrapped = Map::new();
    wrapped.insert(MCP_SERVERS_KEY.to_string(), document);
    Value::Object(wrapped)
}

fn count_servers(path: &Path) -> Option<usize> {
    let document = managed_json::load_json(path).ok()?;
    wrap_servers(document)
        .get(MCP_SERVERS_KEY)
        .and_then(Value::as_object)
        .map(Map::len)
}
