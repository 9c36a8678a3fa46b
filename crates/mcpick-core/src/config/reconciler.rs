//! Reconciliation of the enabled-server set with the host's live config.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use super::managed_json::{self, BaseDocument};
use crate::mcp::{ServerDefinition, ValidationError, servers_to_map, validate_servers_map};

pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// The host config document: the enabled servers plus every other top-level
/// key owned by the host tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveConfig {
    pub servers: Vec<ServerDefinition>,
    pub other: Map<String, Value>,
}

impl LiveConfig {
    /// Validate a whole config document.
    ///
    /// `mcpServers` may be absent; each of its entries must be a valid
    /// definition with the map key as its name.
    pub fn from_value(document: Value) -> Result<Self, ValidationError> {
        let Value::Object(mut other) = document else {
            return Err(ValidationError::NotAnObject("config document"));
        };
        let servers = match other.remove(MCP_SERVERS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => validate_servers_map(&raw)?,
        };
        Ok(Self { servers, other })
    }

    pub fn from_servers(servers: Vec<ServerDefinition>) -> Self {
        Self {
            servers,
            other: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn server_names(&self) -> Vec<String> {
        self.servers.iter().map(|server| server.name.clone()).collect()
    }

    pub fn servers_map(&self) -> Map<String, Value> {
        servers_to_map(&self.servers)
    }

    /// The `{ "mcpServers": {...} }` snapshot used by backups and profiles.
    pub fn snapshot(&self) -> Value {
        let mut document = Map::new();
        document.insert(MCP_SERVERS_KEY.to_string(), Value::Object(self.servers_map()));
        Value::Object(document)
    }
}

/// Flatten the `mcpServers` mapping into named definitions.
pub fn enabled_servers(config: &LiveConfig) -> Vec<ServerDefinition> {
    config.servers.clone()
}

/// Names to add and remove when moving from `current` to `selected`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDelta {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl ServerDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Set difference on names, each side kept in input order.
pub fn compute_delta(current: &[String], selected: &[String]) -> ServerDelta {
    let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
    let selected_set: HashSet<&str> = selected.iter().map(String::as_str).collect();
    ServerDelta {
        to_add: selected
            .iter()
            .filter(|name| !current_set.contains(name.as_str()))
            .cloned()
            .collect(),
        to_remove: current
            .iter()
            .filter(|name| !selected_set.contains(name.as_str()))
            .cloned()
            .collect(),
    }
}

/// Sole writer of the `mcpServers` key in the host config.
#[derive(Debug, Clone)]
pub struct ConfigReconciler {
    config_path: PathBuf,
}

impl ConfigReconciler {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Read the live config. A missing file means nothing is enabled yet.
    pub fn read_enabled(&self) -> anyhow::Result<LiveConfig> {
        if !self.config_path.exists() {
            return Ok(LiveConfig::default());
        }
        let document = managed_json::load_json(&self.config_path)?;
        LiveConfig::from_value(document).with_context(|| {
            format!("Invalid host config: {}", self.config_path.display())
        })
    }

    /// Replace the top-level `mcpServers` with `selected`.
    pub fn write_enabled(&self, selected: &[ServerDefinition]) -> anyhow::Result<()> {
        self.write_enabled_at(&[MCP_SERVERS_KEY], selected)
    }

    /// Replace the server map at a nested JSON path, e.g.
    /// `projects.<path>.mcpServers` for the local scope.
    pub fn write_enabled_at(
        &self,
        json_path: &[&str],
        selected: &[ServerDefinition],
    ) -> anyhow::Result<()> {
        managed_json::replace_map_at_path(
            &self.config_path,
            json_path,
            servers_to_map(selected),
            BaseDocument::Lenient,
        )?;
        tracing::info!(
            path = %self.config_path.display(),
            key = %json_path.join("."),
            count = selected.len(),
            "Updated enabled MCP servers"
        );
        Ok(())
    }
}
