//! mcpick core library
//!
//! Manages which MCP server definitions are enabled for the Claude Code host
//! tool: a registry of known servers, the host's scoped configuration files,
//! timestamped backups and named profiles.

pub mod backup;
pub mod client;
pub mod commands;
pub mod config;
pub mod context;
pub mod mcp;
pub mod profile;
pub mod registry;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::backup::{BackupManager, BackupRecord};
    pub use crate::client::{BridgeOutcome, ClaudeCli, HostCli};
    pub use crate::config::{ConfigReconciler, LiveConfig, McpickPaths, ScopeResolver};
    pub use crate::context::AppContext;
    pub use crate::mcp::{ServerDefinition, Transport, TransportType, ValidationError};
    pub use crate::profile::{ProfileError, ProfileInfo, ProfileStore};
    pub use crate::registry::ServerRegistry;
    pub use crate::types::McpScope;
}
