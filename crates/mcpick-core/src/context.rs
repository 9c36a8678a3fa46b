//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::backup::BackupManager;
use crate::config::{ConfigReconciler, McpickPaths, ScopeResolver};
use crate::profile::ProfileStore;
use crate::registry::ServerRegistry;

/// Resolved paths plus the working directory of this invocation.
///
/// The CLI creates this once and passes it to commands; every store is built
/// from it on demand.
#[derive(Debug, Clone)]
pub struct AppContext {
    paths: McpickPaths,
    cwd: PathBuf,
}

impl AppContext {
    pub fn new(paths: McpickPaths, cwd: PathBuf) -> Self {
        Self { paths, cwd }
    }

    /// Context for the real process environment and working directory.
    pub fn from_env() -> anyhow::Result<Self> {
        let paths = McpickPaths::from_env()?;
        let cwd = std::env::current_dir()?;
        Ok(Self::new(paths, cwd))
    }

    pub fn paths(&self) -> &McpickPaths {
        &self.paths
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn reconciler(&self) -> ConfigReconciler {
        ConfigReconciler::new(self.paths.host_config().to_path_buf())
    }

    pub fn registry(&self) -> ServerRegistry {
        ServerRegistry::new(self.paths.registry_path())
    }

    pub fn backups(&self) -> BackupManager {
        BackupManager::new(self.paths.backups_dir())
    }

    pub fn profiles(&self) -> ProfileStore {
        ProfileStore::new(self.paths.profiles_dir())
    }

    pub fn scope_resolver(&self) -> ScopeResolver {
        ScopeResolver::new(
            self.paths.host_config().to_path_buf(),
            self.paths.home_dir().to_path_buf(),
            self.cwd.clone(),
        )
    }
}
