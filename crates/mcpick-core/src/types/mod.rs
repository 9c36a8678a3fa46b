//! Shared core types used across configuration and command layers.

use std::fmt;

/// Visibility tier of an enabled-server set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpScope {
    /// This project only, stored under `projects[<path>]` in the host config.
    Local,
    /// Shared through a `.mcp.json` file at the project root.
    Project,
    /// Global list in the host config.
    User,
}

impl McpScope {
    pub const ALL: [McpScope; 3] = [McpScope::Local, McpScope::Project, McpScope::User];

    /// Value passed to the host CLI's `--scope` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            McpScope::Local => "local",
            McpScope::Project => "project",
            McpScope::User => "user",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            McpScope::Local => "Local",
            McpScope::Project => "Project",
            McpScope::User => "User (Global)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            McpScope::Local => "This project only (default)",
            McpScope::Project => "Shared via .mcp.json (version controlled)",
            McpScope::User => "Global - all projects",
        }
    }
}

impl fmt::Display for McpScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for McpScope {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(McpScope::Local),
            "project" => Ok(McpScope::Project),
            "user" | "global" => Ok(McpScope::User),
            _ => anyhow::bail!("Invalid scope: '{}'. Valid values: local, project, user", value),
        }
    }
}
