//! Scope resolution: which file and JSON path hold a scope's server list.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::managed_json::{self, BaseDocument};
use super::paths::PROJECT_MCP_FILE;
use super::reconciler::MCP_SERVERS_KEY;
use crate::mcp::{ServerDefinition, servers_to_map};
use crate::types::McpScope;

/// A concrete location of an `mcpServers` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTarget {
    pub path: PathBuf,
    pub json_path: Vec<String>,
}

impl ScopeTarget {
    fn new(path: PathBuf, json_path: &[&str]) -> Self {
        Self {
            path,
            json_path: json_path.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn json_path(&self) -> Vec<&str> {
        self.json_path.iter().map(String::as_str).collect()
    }

    /// Raw entries at this target. A missing file, key or `null` reads as
    /// an empty map; a non-object anywhere on the path is an error.
    pub fn read_servers(&self) -> anyhow::Result<Map<String, Value>> {
        let root = Value::Object(managed_json::load_json_map(&self.path)?);
        let mut node = &root;
        for key in &self.json_path {
            node = match node.get(key.as_str()) {
                None | Some(Value::Null) => return Ok(Map::new()),
                Some(value) if value.is_object() => value,
                Some(_) => anyhow::bail!(
                    "Expected '{key}' in {} to be a JSON object",
                    self.path.display()
                ),
            };
        }
        Ok(node.as_object().cloned().unwrap_or_default())
    }

    /// Direct file write, used for `.mcp.json` targets.
    pub fn write_servers(&self, servers: &[ServerDefinition]) -> anyhow::Result<()> {
        managed_json::replace_map_at_path(
            &self.path,
            &self.json_path(),
            servers_to_map(servers),
            BaseDocument::Lenient,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScopeResolver {
    host_config: PathBuf,
    home_dir: PathBuf,
    cwd: PathBuf,
}

impl ScopeResolver {
    pub fn new(host_config: PathBuf, home_dir: PathBuf, cwd: PathBuf) -> Self {
        Self {
            host_config,
            home_dir,
            cwd,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Directories searched for project and local scopes, nearest first.
    ///
    /// When home is an ancestor of the working directory the search ends at
    /// home; otherwise it runs up to, but not including, the filesystem root.
    pub fn search_dirs(&self) -> Vec<&Path> {
        let bounded_by_home = self.cwd.starts_with(&self.home_dir);
        let mut dirs = Vec::new();
        for dir in self.cwd.ancestors() {
            if dir.parent().is_none() {
                break;
            }
            dirs.push(dir);
            if bounded_by_home && dir == self.home_dir {
                break;
            }
        }
        dirs
    }

    /// Find where a scope's servers currently live. `None` means the scope
    /// has nothing enabled anywhere in the ancestor chain.
    pub fn locate(&self, scope: McpScope) -> Option<ScopeTarget> {
        match scope {
            McpScope::User => Some(self.user_target()),
            McpScope::Project => self.find_project_file(),
            McpScope::Local => self.find_local_entry(),
        }
    }

    /// Where edits for a scope are written: the located target, or the
    /// working-directory default when none exists yet.
    pub fn write_target(&self, scope: McpScope) -> ScopeTarget {
        self.locate(scope).unwrap_or_else(|| match scope {
            McpScope::User => self.user_target(),
            McpScope::Project => {
                ScopeTarget::new(self.cwd.join(PROJECT_MCP_FILE), &[MCP_SERVERS_KEY])
            }
            McpScope::Local => self.local_target(&self.cwd),
        })
    }

    /// Raw `mcpServers` entries of a scope.
    pub fn read_servers(&self, scope: McpScope) -> anyhow::Result<Map<String, Value>> {
        match self.locate(scope) {
            Some(target) => target.read_servers(),
            None => Ok(Map::new()),
        }
    }

    pub fn enabled_names(&self, scope: McpScope) -> anyhow::Result<Vec<String>> {
        Ok(self.read_servers(scope)?.keys().cloned().collect())
    }

    fn user_target(&self) -> ScopeTarget {
        ScopeTarget::new(self.host_config.clone(), &[MCP_SERVERS_KEY])
    }

    fn local_target(&self, dir: &Path) -> ScopeTarget {
        let project_key = dir.to_string_lossy().to_string();
        ScopeTarget::new(
            self.host_config.clone(),
            &["projects", project_key.as_str(), MCP_SERVERS_KEY],
        )
    }

    fn find_project_file(&self) -> Option<ScopeTarget> {
        for dir in self.search_dirs() {
            let candidate = dir.join(PROJECT_MCP_FILE);
            if !candidate.is_file() {
                continue;
            }
            let target = ScopeTarget::new(candidate, &[MCP_SERVERS_KEY]);
            match target.read_servers() {
                Ok(_) => return Some(target),
                Err(err) => {
                    tracing::warn!(
                        path = %target.path.display(),
                        "Skipping unreadable project config: {err:#}"
                    );
                }
            }
        }
        None
    }

    fn find_local_entry(&self) -> Option<ScopeTarget> {
        let root = match managed_json::load_json_map(&self.host_config) {
            Ok(root) => root,
            Err(err) => {
                tracing::warn!(
                    path = %self.host_config.display(),
                    "Cannot read host config: {err:#}"
                );
                return None;
            }
        };
        let projects = root.get("projects").and_then(Value::as_object)?;
        self.search_dirs().into_iter().find_map(|dir| {
            let key = dir.to_string_lossy();
            let has_servers = projects
                .get(key.as_ref())
                .and_then(|project| project.get(MCP_SERVERS_KEY))
                .and_then(Value::as_object)
                .is_some_and(|servers| !servers.is_empty());
            has_servers.then(|| self.local_target(dir))
        })
    }
}
