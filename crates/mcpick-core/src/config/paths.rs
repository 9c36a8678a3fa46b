//! Config path resolution helpers.
//!
//! Paths are resolved once per invocation from the home directory and an
//! environment lookup, then threaded through [`crate::context::AppContext`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternate base directory.
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

pub const HOST_CONFIG_FILE: &str = ".claude.json";
pub const PROJECT_MCP_FILE: &str = ".mcp.json";

/// All files mcpick reads or writes outside the project tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpickPaths {
    home_dir: PathBuf,
    base_dir: PathBuf,
    host_config: PathBuf,
}

impl McpickPaths {
    /// Resolve paths from a home directory and an environment lookup.
    ///
    /// Without an override the host config lives at `~/.claude.json` and
    /// mcpick data under `~/.claude/mcpick`. With `CLAUDE_CONFIG_DIR` set,
    /// both move under that directory.
    pub fn resolve<F>(home_dir: &Path, env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let override_dir = env(CONFIG_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .map(|dir| if dir.is_relative() { home_dir.join(dir) } else { dir });

        match override_dir {
            Some(base_dir) => Self {
                home_dir: home_dir.to_path_buf(),
                host_config: base_dir.join(HOST_CONFIG_FILE),
                base_dir,
            },
            None => Self {
                home_dir: home_dir.to_path_buf(),
                base_dir: home_dir.join(".claude"),
                host_config: home_dir.join(HOST_CONFIG_FILE),
            },
        }
    }

    /// Resolve from the real process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(Self::resolve(&home, |key| std::env::var_os(key)))
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The host CLI's live config (`.claude.json`).
    pub fn host_config(&self) -> &Path {
        &self.host_config
    }

    pub fn mcpick_dir(&self) -> PathBuf {
        self.base_dir.join("mcpick")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.mcpick_dir().join("servers.json")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.mcpick_dir().join("backups")
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.mcpick_dir().join("profiles")
    }
}
