//! Registry persistence in the mcpick data directory.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::schema::Registry;
use crate::config::managed_json;
use crate::mcp::ServerDefinition;

/// Durable catalog of server definitions.
///
/// Every mutating call is a single read-modify-write of the backing file.
#[derive(Debug, Clone)]
pub struct ServerRegistry {
    path: PathBuf,
}

impl ServerRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry, creating an empty registry file on first access.
    pub fn load(&self) -> anyhow::Result<Registry> {
        if !self.path.exists() {
            let registry = Registry::new();
            self.save(&registry)?;
            tracing::debug!(path = %self.path.display(), "Created empty server registry");
            return Ok(registry);
        }
        let value = managed_json::load_json(&self.path)?;
        serde_json::from_value(value)
            .with_context(|| format!("Invalid server registry: {}", self.path.display()))
    }

    pub fn save(&self, registry: &Registry) -> anyhow::Result<()> {
        managed_json::write_json(&self.path, registry)
    }

    pub fn upsert(&self, definition: ServerDefinition) -> anyhow::Result<()> {
        self.sync_many(std::iter::once(definition))
    }

    /// Upsert every definition, writing the file once.
    pub fn sync_many<I>(&self, definitions: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = ServerDefinition>,
    {
        let mut registry = self.load()?;
        let mut count = 0usize;
        for definition in definitions {
            registry.upsert(definition);
            count += 1;
        }
        self.save(&registry)?;
        tracing::debug!(count, total = registry.len(), "Synced servers to registry");
        Ok(())
    }

    pub fn list_all(&self) -> anyhow::Result<Vec<ServerDefinition>> {
        Ok(self.load()?.servers)
    }

    pub fn get(&self, name: &str) -> anyhow::Result<Option<ServerDefinition>> {
        Ok(self.load()?.get(name).cloned())
    }
}
