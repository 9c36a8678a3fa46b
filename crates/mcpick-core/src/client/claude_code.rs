//! `claude` CLI implementation of the host bridge.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

use anyhow::Context;

use super::{BridgeOutcome, HostCli};
use crate::mcp::{ServerDefinition, Transport};
use crate::types::McpScope;

const DEFAULT_PROGRAM: &str = "claude";

#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: OsString,
}

impl Default for ClaudeCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeCli {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a different executable, e.g. an absolute path to `claude`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn run(&self, args: &[String]) -> BridgeOutcome {
        tracing::debug!(program = %self.program_name(), ?args, "Running host CLI");
        let output = match Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                return BridgeOutcome::Failed(format!(
                    "Failed to run {}: {err}",
                    self.program_name()
                ));
            }
        };
        if output.status.success() {
            return BridgeOutcome::Success;
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("{} exited with {}", self.program_name(), output.status),
            message => message.to_string(),
        };
        BridgeOutcome::Failed(reason)
    }
}

impl HostCli for ClaudeCli {
    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn install(&self, definition: &ServerDefinition, scope: McpScope) -> BridgeOutcome {
        self.run(&add_args(definition, scope))
    }

    fn uninstall(&self, name: &str, scope: McpScope) -> BridgeOutcome {
        self.run(&remove_args(name, scope))
    }

    fn launch(&self) -> anyhow::Result<()> {
        let status = match Command::new(&self.program).status() {
            Ok(status) => status,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                anyhow::bail!("Claude Code not found. Make sure it is installed and in your PATH.")
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to launch {}", self.program_name()));
            }
        };
        if !status.success() {
            tracing::warn!(%status, "Claude Code exited with an error");
        }
        Ok(())
    }
}

/// `mcp add --scope <s> --transport <t> [-e K=V].. [-H "K: V"].. <name> ...`
///
/// Stdio servers end with `-- <command> <args..>`, remote servers with the URL.
pub fn add_args(definition: &ServerDefinition, scope: McpScope) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "mcp".into(),
        "add".into(),
        "--scope".into(),
        scope.as_str().into(),
        "--transport".into(),
        definition.transport_type().as_str().into(),
    ];
    for (key, value) in &definition.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }
    if let Some(headers) = definition.headers() {
        for (key, value) in headers {
            args.push("-H".into());
            args.push(format!("{key}: {value}"));
        }
    }
    args.push(definition.name.clone());
    match &definition.transport {
        Transport::Stdio { command, args: rest } => {
            args.push("--".into());
            args.push(command.clone());
            args.extend(rest.iter().cloned());
        }
        Transport::Sse { url, .. } | Transport::Http { url, .. } => args.push(url.clone()),
    }
    args
}

pub fn remove_args(name: &str, scope: McpScope) -> Vec<String> {
    vec![
        "mcp".into(),
        "remove".into(),
        name.into(),
        "--scope".into(),
        scope.as_str().into(),
    ]
}
