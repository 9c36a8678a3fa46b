//! Host configuration access for the three MCP scopes
//!
//! - User: `mcpServers` in the host config
//! - Project: `.mcp.json` at the nearest project root
//! - Local: `projects[<path>].mcpServers` in the host config

pub mod managed_json;
pub mod paths;
pub mod reconciler;
pub mod scope;

pub use paths::McpickPaths;
pub use reconciler::{
    ConfigReconciler, LiveConfig, MCP_SERVERS_KEY, ServerDelta, compute_delta, enabled_servers,
};
pub use scope::{ScopeResolver, ScopeTarget};
