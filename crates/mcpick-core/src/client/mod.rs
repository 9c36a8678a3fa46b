//! Host client bridge.
//!
//! When the host tool's own CLI is installed, scoped installs and removals go
//! through it so the host stays the owner of its scope bookkeeping. Callers
//! hold a `&dyn HostCli` so tests can substitute a scripted host.

pub mod claude_code;

pub use claude_code::ClaudeCli;

use crate::mcp::ServerDefinition;
use crate::types::McpScope;

/// Result of a single bridge call. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    Success,
    Failed(String),
}

impl BridgeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BridgeOutcome::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BridgeOutcome::Success => None,
            BridgeOutcome::Failed(reason) => Some(reason),
        }
    }
}

pub trait HostCli {
    /// Whether the host CLI can be invoked at all.
    fn is_available(&self) -> bool;

    fn install(&self, definition: &ServerDefinition, scope: McpScope) -> BridgeOutcome;

    fn uninstall(&self, name: &str, scope: McpScope) -> BridgeOutcome;

    /// Start the host tool in the foreground and wait for it to exit.
    fn launch(&self) -> anyhow::Result<()>;
}
