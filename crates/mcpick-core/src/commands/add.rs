//! Add-server command and the parsers behind its input forms.

use std::collections::BTreeMap;

use anyhow::Context;
use serde_json::{Map, Value};

use crate::client::HostCli;
use crate::context::AppContext;
use crate::mcp::{ServerDefinition, TransportType, validate_entry, validate_server};
use crate::types::McpScope;

/// Options for the add-server command
#[derive(Debug, Clone)]
pub struct AddOptions {
    pub definition: ServerDefinition,
    pub scope: McpScope,
}

/// Report from an add-server operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReport {
    pub name: String,
    pub scope: McpScope,
    /// Whether the host CLI activated the server in `scope`
    pub installed: bool,
    pub warnings: Vec<String>,
}

pub struct AddCommand<'a> {
    ctx: &'a AppContext,
    host: &'a dyn HostCli,
}

impl<'a> AddCommand<'a> {
    pub fn new(ctx: &'a AppContext, host: &'a dyn HostCli) -> Self {
        Self { ctx, host }
    }

    /// Record the server in the registry, then try to activate it through the
    /// host CLI. Activation problems are warnings; the registry write is not
    /// rolled back.
    pub fn execute(&self, options: &AddOptions) -> anyhow::Result<AddReport> {
        let definition = &options.definition;
        self.ctx
            .registry()
            .upsert(definition.clone())
            .with_context(|| format!("Failed to add '{}' to registry", definition.name))?;

        let mut warnings = Vec::new();
        let installed = if !self.host.is_available() {
            warnings.push(
                "Claude CLI not found. Server added to registry only. \
                 Install Claude Code and run 'claude mcp add' to activate."
                    .to_string(),
            );
            false
        } else if let Some(reason) = self.host.install(definition, options.scope).error() {
            warnings.push(format!(
                "CLI installation failed: {reason}. Server added to registry only. \
                 Use 'claude mcp add' manually."
            ));
            false
        } else {
            true
        };

        Ok(AddReport {
            name: definition.name.clone(),
            scope: options.scope,
            installed,
            warnings,
        })
    }
}

/// Fields collected by the step-by-step form.
#[derive(Debug, Clone, Default)]
pub struct ServerForm {
    pub name: String,
    pub transport: TransportType,
    pub command: String,
    pub args: Vec<String>,
    pub url: String,
    pub description: String,
    pub env: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl ServerForm {
    /// Validate the form through the same rules as any stored definition.
    pub fn build(&self) -> anyhow::Result<ServerDefinition> {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(self.name.clone()));
        obj.insert("type".into(), Value::String(self.transport.as_str().into()));
        if self.transport.is_remote() {
            obj.insert("url".into(), Value::String(self.url.clone()));
            if !self.headers.is_empty() {
                obj.insert("headers".into(), string_map(&self.headers));
            }
        } else {
            obj.insert("command".into(), Value::String(self.command.clone()));
            obj.insert(
                "args".into(),
                Value::Array(self.args.iter().cloned().map(Value::String).collect()),
            );
        }
        if !self.env.is_empty() {
            obj.insert("env".into(), string_map(&self.env));
        }
        let description = self.description.trim();
        if !description.is_empty() {
            obj.insert("description".into(), Value::String(description.into()));
        }
        Ok(validate_server(&Value::Object(obj))?)
    }
}

fn string_map(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

/// Split comma-separated arguments, trimming each and dropping empties.
///
/// Commas inside an argument cannot be escaped.
pub fn parse_args_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `KEY=value, KEY2=value2`. Values may contain `=`.
pub fn parse_pairs_input(input: &str, label: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for pair in input.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("Invalid {} entry (expected KEY=value): {}", label, pair)
        })?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid {} entry (empty key): {}", label, pair);
        }
        map.insert(key.to_string(), value.trim().to_string());
    }
    Ok(map)
}

/// Parse a pasted JSON server definition.
///
/// Braces are added when the paste lacks them, so `"name": "x", "command":
/// "y"` works. A single `"name": {entry}` pair is accepted as well. For
/// url-based types any `command`/`args` are dropped before validation.
pub fn parse_json_input(input: &str) -> anyhow::Result<ServerDefinition> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JSON configuration is required");
    }
    let text = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        format!("{{{trimmed}}}")
    };
    let value: Value = serde_json::from_str(&text).context("Invalid JSON format")?;
    let Value::Object(mut obj) = value else {
        anyhow::bail!("JSON must be an object");
    };

    if let Some((name, entry)) = single_named_entry(&obj) {
        let mut entry = entry.clone();
        if let Value::Object(entry_obj) = &mut entry {
            normalize(entry_obj);
        }
        return Ok(validate_entry(&name, &entry)?);
    }

    normalize(&mut obj);
    Ok(validate_server(&Value::Object(obj))?)
}

fn single_named_entry(obj: &Map<String, Value>) -> Option<(String, &Value)> {
    if obj.len() != 1 {
        return None;
    }
    let (name, entry) = obj.iter().next()?;
    if matches!(name.as_str(), "name" | "command" | "url" | "type") || !entry.is_object() {
        return None;
    }
    Some((name.clone(), entry))
}

fn normalize(obj: &mut Map<String, Value>) {
    let remote = obj
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind != TransportType::Stdio.as_str());
    if remote {
        obj.remove("command");
        obj.remove("args");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::Transport;

    #[test]
    fn test_parse_args_input() {
        assert_eq!(
            parse_args_input(" -y , @scope/server,, --port,3000 "),
            vec!["-y", "@scope/server", "--port", "3000"]
        );
        assert!(parse_args_input("   ").is_empty());
    }

    #[test]
    fn test_parse_pairs_input() {
        let pairs = parse_pairs_input("API_KEY=abc=, TIMEOUT = 30", "env").unwrap();
        assert_eq!(pairs.get("API_KEY").map(String::as_str), Some("abc="));
        assert_eq!(pairs.get("TIMEOUT").map(String::as_str), Some("30"));
        assert!(parse_pairs_input("", "env").unwrap().is_empty());
        assert!(parse_pairs_input("NOVALUE", "env").is_err());
        assert!(parse_pairs_input("=x", "env").is_err());
    }

    #[test]
    fn test_parse_json_input_without_braces() {
        let definition =
            parse_json_input(r#""name": "sqlite", "command": "npx", "args": ["-y", "mcp-sqlite"]"#)
                .unwrap();
        assert_eq!(definition.name, "sqlite");
        assert_eq!(definition.command(), Some("npx"));
        assert_eq!(definition.args(), ["-y", "mcp-sqlite"]);
    }

    #[test]
    fn test_parse_json_input_named_entry() {
        let definition = parse_json_input(r#"{"fs": {"command": "node"}}"#).unwrap();
        assert_eq!(definition.name, "fs");
        assert!(definition.args().is_empty());
    }

    #[test]
    fn test_parse_json_input_drops_command_for_remote() {
        let definition = parse_json_input(
            r#"{"name": "api", "type": "sse", "url": "https://x/sse", "command": "ignored"}"#,
        )
        .unwrap();
        assert!(matches!(definition.transport, Transport::Sse { .. }));
    }

    #[test]
    fn test_parse_json_input_errors() {
        assert!(parse_json_input("").is_err());
        assert!(parse_json_input("{not json").is_err());
        assert!(parse_json_input(r#"{"name": "x"}"#).is_err());
    }

    #[test]
    fn test_form_build() {
        let form = ServerForm {
            name: "api".to_string(),
            transport: TransportType::Http,
            command: "leftover".to_string(),
            url: "https://api.example/mcp".to_string(),
            headers: BTreeMap::from([("Authorization".to_string(), "Bearer t".to_string())]),
            ..Default::default()
        };
        let definition = form.build().unwrap();
        assert_eq!(definition.url(), Some("https://api.example/mcp"));
        assert_eq!(definition.headers().map(BTreeMap::len), Some(1));

        let missing_command = ServerForm {
            name: "x".to_string(),
            ..Default::default()
        };
        assert!(missing_command.build().is_err());
    }
}
