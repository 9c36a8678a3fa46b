//! Edit-config command: choose which registry servers are enabled in a scope.

use anyhow::Context;
use serde_json::Value;

use crate::client::HostCli;
use crate::config::{compute_delta, enabled_servers};
use crate::context::AppContext;
use crate::mcp::{ServerDefinition, validate_servers_map};
use crate::types::McpScope;

/// Options for the edit-config command
#[derive(Debug, Clone)]
pub struct EditOptions {
    pub scope: McpScope,
    /// Names of the servers that should be enabled afterwards
    pub selected: Vec<String>,
}

impl EditOptions {
    pub fn new(scope: McpScope, selected: Vec<String>) -> Self {
        Self { scope, selected }
    }
}

/// Servers offered for selection, with the result of registry bootstrap.
#[derive(Debug, Clone, Default)]
pub struct AvailableServers {
    pub servers: Vec<ServerDefinition>,
    /// How many servers found in existing config files were added to the
    /// registry.
    pub imported: usize,
}

/// Report from an edit-config operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    pub scope: McpScope,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Number of servers enabled in the scope afterwards
    pub enabled: usize,
    /// Whether changes went through the host CLI instead of a file write
    pub via_host_cli: bool,
    /// Per-server host CLI failures
    pub errors: Vec<String>,
}

impl EditReport {
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

pub struct EditCommand<'a> {
    ctx: &'a AppContext,
    host: &'a dyn HostCli,
}

impl<'a> EditCommand<'a> {
    pub fn new(ctx: &'a AppContext, host: &'a dyn HostCli) -> Self {
        Self { ctx, host }
    }

    /// Servers offered for `scope`. An empty registry is seeded from the
    /// host config, and anything enabled in `scope` but unknown to the
    /// registry is added, so every current entry can be kept.
    pub fn available_servers(&self, scope: McpScope) -> anyhow::Result<AvailableServers> {
        let registry = self.ctx.registry();
        let known = registry.list_all()?;

        let mut discovered = if known.is_empty() {
            enabled_servers(&self.ctx.reconciler().read_enabled()?)
        } else {
            Vec::new()
        };
        let raw = self.ctx.scope_resolver().read_servers(scope)?;
        let in_scope = validate_servers_map(&Value::Object(raw))
            .with_context(|| format!("Invalid server entry in {scope} scope"))?;
        for server in in_scope {
            let seen = known
                .iter()
                .chain(&discovered)
                .any(|existing| existing.name == server.name);
            if !seen {
                discovered.push(server);
            }
        }

        if discovered.is_empty() {
            return Ok(AvailableServers {
                servers: known,
                imported: 0,
            });
        }
        registry.sync_many(discovered.iter().cloned())?;
        tracing::info!(count = discovered.len(), %scope, "Imported servers into registry");
        Ok(AvailableServers {
            imported: discovered.len(),
            servers: registry.list_all()?,
        })
    }

    /// Names currently enabled in `scope`, used as the initial selection.
    pub fn current_enabled(&self, scope: McpScope) -> anyhow::Result<Vec<String>> {
        self.ctx.scope_resolver().enabled_names(scope)
    }

    pub fn execute(&self, options: &EditOptions) -> anyhow::Result<EditReport> {
        let available = self.available_servers(options.scope)?;
        let selected = select_definitions(&available.servers, &options.selected)?;
        let current = self.current_enabled(options.scope)?;
        let delta = compute_delta(&current, &options.selected);

        let via_host_cli = options.scope != McpScope::User && self.host.is_available();
        let mut errors = Vec::new();
        if via_host_cli {
            for name in &delta.to_add {
                let Some(definition) = selected.iter().find(|server| &server.name == name) else {
                    continue;
                };
                if let Some(reason) = self.host.install(definition, options.scope).error() {
                    tracing::warn!(server = %name, "Host CLI install failed: {reason}");
                    errors.push(format!("Failed to add {name}: {reason}"));
                }
            }
            for name in &delta.to_remove {
                if let Some(reason) = self.host.uninstall(name, options.scope).error() {
                    tracing::warn!(server = %name, "Host CLI remove failed: {reason}");
                    errors.push(format!("Failed to remove {name}: {reason}"));
                }
            }
        } else {
            self.write_scope(options.scope, &selected)?;
        }

        self.ctx
            .registry()
            .sync_many(selected.iter().cloned())
            .context("Failed to sync registry")?;

        Ok(EditReport {
            scope: options.scope,
            added: delta.to_add,
            removed: delta.to_remove,
            enabled: selected.len(),
            via_host_cli,
            errors,
        })
    }

    fn write_scope(&self, scope: McpScope, selected: &[ServerDefinition]) -> anyhow::Result<()> {
        let target = self.ctx.scope_resolver().write_target(scope);
        match scope {
            McpScope::User => self.ctx.reconciler().write_enabled(selected),
            McpScope::Local => self
                .ctx
                .reconciler()
                .write_enabled_at(&target.json_path(), selected),
            McpScope::Project => target.write_servers(selected).with_context(|| {
                format!("Failed to update {}", target.path.display())
            }),
        }
    }
}

/// Definitions for `names`, in registry order. Unknown names are an error.
fn select_definitions(
    available: &[ServerDefinition],
    names: &[String],
) -> anyhow::Result<Vec<ServerDefinition>> {
    if let Some(unknown) = names
        .iter()
        .find(|name| !available.iter().any(|server| &server.name == *name))
    {
        anyhow::bail!("Unknown server: {unknown}");
    }
    Ok(available
        .iter()
        .filter(|server| names.contains(&server.name))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::client::BridgeOutcome;
    use crate::config::McpickPaths;
    use crate::config::managed_json;

    #[derive(Default)]
    struct ScriptedHost {
        available: bool,
        fail: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    impl HostCli for ScriptedHost {
        fn is_available(&self) -> bool {
            self.available
        }

        fn install(&self, definition: &ServerDefinition, scope: McpScope) -> BridgeOutcome {
            self.calls
                .borrow_mut()
                .push(format!("add {} {scope}", definition.name));
            if self.fail.contains(&definition.name) {
                BridgeOutcome::Failed("boom".to_string())
            } else {
                BridgeOutcome::Success
            }
        }

        fn uninstall(&self, name: &str, scope: McpScope) -> BridgeOutcome {
            self.calls.borrow_mut().push(format!("remove {name} {scope}"));
            BridgeOutcome::Success
        }

        fn launch(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn setup() -> (TempDir, AppContext) {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home");
        let project = home.join("project");
        std::fs::create_dir_all(&project).unwrap();
        let paths = McpickPaths::resolve(&home, |_| None);
        (temp, AppContext::new(paths, project))
    }

    fn seed_host_config(ctx: &AppContext) {
        managed_json::write_json(
            ctx.paths().host_config(),
            &json!({
                "theme": "dark",
                "mcpServers": {
                    "a": {"command": "node", "args": ["a.js"]},
                    "b": {"type": "http", "url": "https://b.example/mcp"}
                }
            }),
        )
        .unwrap();
    }

    #[test]
    fn test_bootstraps_registry_from_host_config() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        let host = ScriptedHost::default();

        let command = EditCommand::new(&ctx, &host);
        let available = command.available_servers(McpScope::User).unwrap();
        assert_eq!(available.imported, 2);
        assert_eq!(ctx.registry().list_all().unwrap().len(), 2);

        let again = command.available_servers(McpScope::User).unwrap();
        assert_eq!(again.imported, 0);
    }

    #[test]
    fn test_user_scope_writes_host_config() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        let host = ScriptedHost {
            available: true,
            ..Default::default()
        };

        let report = EditCommand::new(&ctx, &host)
            .execute(&EditOptions::new(McpScope::User, vec!["b".to_string()]))
            .unwrap();

        assert!(!report.via_host_cli);
        assert_eq!(report.removed, vec!["a"]);
        assert!(host.calls.borrow().is_empty());
        let doc = managed_json::load_json(ctx.paths().host_config()).unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(
            doc["mcpServers"].as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["b"]
        );
    }

    #[test]
    fn test_project_scope_uses_host_cli_and_counts_failures() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        let host = ScriptedHost {
            available: true,
            fail: vec!["b".to_string()],
            ..Default::default()
        };

        let report = EditCommand::new(&ctx, &host)
            .execute(&EditOptions::new(
                McpScope::Project,
                vec!["a".to_string(), "b".to_string()],
            ))
            .unwrap();

        assert!(report.via_host_cli);
        assert_eq!(report.added, vec!["a", "b"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            *host.calls.borrow(),
            vec!["add a project".to_string(), "add b project".to_string()]
        );
        assert!(!ctx.cwd().join(".mcp.json").exists());
    }

    #[test]
    fn test_project_scope_without_host_cli_writes_mcp_json() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        let host = ScriptedHost::default();

        EditCommand::new(&ctx, &host)
            .execute(&EditOptions::new(McpScope::Project, vec!["a".to_string()]))
            .unwrap();

        let doc = managed_json::load_json(&ctx.cwd().join(".mcp.json")).unwrap();
        assert_eq!(doc, json!({"mcpServers": {"a": {"command": "node", "args": ["a.js"]}}}));
        let host_doc = managed_json::load_json(ctx.paths().host_config()).unwrap();
        assert_eq!(host_doc["mcpServers"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_project_servers_outside_registry_are_offered_and_kept() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        managed_json::write_json(
            &ctx.cwd().join(".mcp.json"),
            &json!({"mcpServers": {"team": {"command": "team-mcp"}}}),
        )
        .unwrap();
        let host = ScriptedHost::default();
        let command = EditCommand::new(&ctx, &host);

        let available = command.available_servers(McpScope::Project).unwrap();
        let offered: Vec<_> = available.servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(offered, vec!["a", "b", "team"]);
        assert_eq!(available.imported, 3);

        let report = command
            .execute(&EditOptions::new(
                McpScope::Project,
                vec!["a".to_string(), "team".to_string()],
            ))
            .unwrap();

        assert_eq!(report.added, vec!["a"]);
        assert!(report.removed.is_empty());
        let doc = managed_json::load_json(&ctx.cwd().join(".mcp.json")).unwrap();
        assert_eq!(
            doc["mcpServers"].as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["a", "team"]
        );
    }

    #[test]
    fn test_local_servers_join_a_populated_registry() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        let host = ScriptedHost::default();
        let command = EditCommand::new(&ctx, &host);
        command.available_servers(McpScope::User).unwrap();

        let project_key = ctx.cwd().to_string_lossy().to_string();
        let mut doc = managed_json::load_json(ctx.paths().host_config()).unwrap();
        doc["projects"] = json!({ project_key: {"mcpServers": {"mine": {"command": "m"}}} });
        managed_json::write_json(ctx.paths().host_config(), &doc).unwrap();

        let available = command.available_servers(McpScope::Local).unwrap();
        assert_eq!(available.imported, 1);
        assert!(ctx.registry().get("mine").unwrap().is_some());
        assert_eq!(command.current_enabled(McpScope::Local).unwrap(), vec!["mine"]);
    }

    #[test]
    fn test_unknown_selection_is_rejected() {
        let (_temp, ctx) = setup();
        seed_host_config(&ctx);
        let host = ScriptedHost::default();

        let err = EditCommand::new(&ctx, &host)
            .execute(&EditOptions::new(McpScope::User, vec!["zzz".to_string()]))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown server: zzz"));
    }
}
