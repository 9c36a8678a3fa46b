//! Backup and restore of the user-scope enabled-server set.

use anyhow::Context;

use crate::backup::BackupRecord;
use crate::context::AppContext;

/// Report from a restore operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub backup: BackupRecord,
    pub servers: Vec<String>,
}

pub struct BackupCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> BackupCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Snapshot the host config's enabled servers.
    pub fn create(&self) -> anyhow::Result<BackupRecord> {
        let reconciler = self.ctx.reconciler();
        if !reconciler.config_path().exists() {
            anyhow::bail!(
                "No host config found to back up: {}",
                reconciler.config_path().display()
            );
        }
        let live = reconciler.read_enabled()?;
        self.ctx.backups().create(&live)
    }

    pub fn list(&self) -> anyhow::Result<Vec<BackupRecord>> {
        self.ctx.backups().list()
    }

    /// Replace the enabled servers with a backup's. Unrelated host config
    /// keys are left alone.
    pub fn restore(&self, backup: &BackupRecord) -> anyhow::Result<RestoreReport> {
        let snapshot = self.ctx.backups().load(backup)?;
        self.ctx
            .reconciler()
            .write_enabled(&snapshot.servers)
            .with_context(|| format!("Failed to restore {}", backup.filename))?;
        self.ctx
            .registry()
            .sync_many(snapshot.servers.iter().cloned())?;
        tracing::info!(
            backup = %backup.filename,
            count = snapshot.servers.len(),
            "Restored backup"
        );
        Ok(RestoreReport {
            backup: backup.clone(),
            servers: snapshot.server_names(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::config::McpickPaths;
    use crate::config::managed_json;

    fn setup() -> (TempDir, AppContext) {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        let paths = McpickPaths::resolve(&home, |_| None);
        (temp, AppContext::new(paths, home))
    }

    #[test]
    fn test_backup_requires_host_config() {
        let (_temp, ctx) = setup();
        let err = BackupCommand::new(&ctx).create().unwrap_err();
        assert!(err.to_string().contains("No host config found"));
    }

    #[test]
    fn test_restore_preserves_other_keys() {
        let (_temp, ctx) = setup();
        let host_config = ctx.paths().host_config();
        managed_json::write_json(
            host_config,
            &json!({"userID": "u1", "mcpServers": {"fs": {"command": "node"}}}),
        )
        .unwrap();

        let command = BackupCommand::new(&ctx);
        let record = command.create().unwrap();

        managed_json::write_json(host_config, &json!({"userID": "u2", "mcpServers": {}})).unwrap();
        let report = command.restore(&record).unwrap();

        assert_eq!(report.servers, vec!["fs"]);
        let doc = managed_json::load_json(host_config).unwrap();
        assert_eq!(doc["userID"], "u2");
        assert_eq!(doc["mcpServers"], json!({"fs": {"command": "node", "args": []}}));
    }
}
