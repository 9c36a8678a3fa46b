//! MCP server definition schema
//!
//! A server definition is a named connection descriptor. The transport decides
//! which fields are meaningful: stdio servers are launched from a command line,
//! sse/http servers are reached at a URL.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::validation::validate_server;

/// Transport types for MCP servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportType {
    /// Command-based execution (default)
    #[default]
    Stdio,
    /// Server-sent events
    Sse,
    /// HTTP-based MCP server
    Http,
}

impl TransportType {
    pub const ALL: [TransportType; 3] =
        [TransportType::Stdio, TransportType::Sse, TransportType::Http];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Stdio => "stdio",
            TransportType::Sse => "sse",
            TransportType::Http => "http",
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, TransportType::Stdio)
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "stdio" => Ok(TransportType::Stdio),
            "sse" => Ok(TransportType::Sse),
            "http" => Ok(TransportType::Http),
            _ => anyhow::bail!(
                "Invalid transport: '{}'. Valid values: stdio, sse, http",
                value
            ),
        }
    }
}

/// Transport-specific part of a server definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Stdio {
        command: String,
        args: Vec<String>,
    },
    Sse {
        url: String,
        headers: BTreeMap<String, String>,
    },
    Http {
        url: String,
        headers: BTreeMap<String, String>,
    },
}

impl Transport {
    pub fn kind(&self) -> TransportType {
        match self {
            Transport::Stdio { .. } => TransportType::Stdio,
            Transport::Sse { .. } => TransportType::Sse,
            Transport::Http { .. } => TransportType::Http,
        }
    }

    /// Build a url-based transport of the given kind.
    ///
    /// Returns `None` for [`TransportType::Stdio`], which has no URL.
    pub fn remote(
        kind: TransportType,
        url: String,
        headers: BTreeMap<String, String>,
    ) -> Option<Self> {
        match kind {
            TransportType::Stdio => None,
            TransportType::Sse => Some(Transport::Sse { url, headers }),
            TransportType::Http => Some(Transport::Http { url, headers }),
        }
    }
}

/// A validated, named MCP server definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDefinition {
    pub name: String,
    pub transport: Transport,
    pub env: BTreeMap<String, String>,
    pub description: Option<String>,
    /// Advisory context cost of the server's tools.
    pub estimated_tokens: Option<u64>,
}

impl ServerDefinition {
    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Stdio {
                command: command.into(),
                args,
            },
            env: BTreeMap::new(),
            description: None,
            estimated_tokens: None,
        }
    }

    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Http {
                url: url.into(),
                headers: BTreeMap::new(),
            },
            env: BTreeMap::new(),
            description: None,
            estimated_tokens: None,
        }
    }

    pub fn sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Sse {
                url: url.into(),
                headers: BTreeMap::new(),
            },
            env: BTreeMap::new(),
            description: None,
            estimated_tokens: None,
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_estimated_tokens(mut self, tokens: u64) -> Self {
        self.estimated_tokens = Some(tokens);
        self
    }

    pub fn transport_type(&self) -> TransportType {
        self.transport.kind()
    }

    pub fn command(&self) -> Option<&str> {
        match &self.transport {
            Transport::Stdio { command, .. } => Some(command),
            _ => None,
        }
    }

    pub fn args(&self) -> &[String] {
        match &self.transport {
            Transport::Stdio { args, .. } => args,
            _ => &[],
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.transport {
            Transport::Sse { url, .. } | Transport::Http { url, .. } => Some(url),
            Transport::Stdio { .. } => None,
        }
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        match &self.transport {
            Transport::Sse { headers, .. } | Transport::Http { headers, .. } => Some(headers),
            Transport::Stdio { .. } => None,
        }
    }

    /// Render the definition as a config entry, without its name.
    ///
    /// This is the value stored under `mcpServers.<name>`.
    pub fn to_entry(&self) -> Map<String, Value> {
        let mut entry = Map::new();
        match &self.transport {
            Transport::Stdio { command, args } => {
                entry.insert("command".to_string(), json!(command));
                entry.insert("args".to_string(), json!(args));
            }
            Transport::Sse { url, headers } | Transport::Http { url, headers } => {
                entry.insert("type".to_string(), json!(self.transport_type().as_str()));
                entry.insert("url".to_string(), json!(url));
                if !headers.is_empty() {
                    entry.insert("headers".to_string(), json!(headers));
                }
            }
        }
        if !self.env.is_empty() {
            entry.insert("env".to_string(), json!(self.env));
        }
        if let Some(description) = &self.description {
            entry.insert("description".to_string(), json!(description));
        }
        if let Some(tokens) = self.estimated_tokens {
            entry.insert("estimated_tokens".to_string(), json!(tokens));
        }
        entry
    }

    /// Render the full definition including `name`, as stored in the registry.
    pub fn to_value(&self) -> Value {
        let mut value = Map::new();
        value.insert("name".to_string(), json!(self.name));
        value.extend(self.to_entry());
        Value::Object(value)
    }
}

impl Serialize for ServerDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ServerDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        validate_server(&raw).map_err(D::Error::custom)
    }
}

/// Build an `mcpServers` map from definitions, keyed by name.
///
/// Later definitions with a duplicate name replace earlier ones.
pub fn servers_to_map(servers: &[ServerDefinition]) -> Map<String, Value> {
    let mut map = Map::new();
    for server in servers {
        map.insert(server.name.clone(), Value::Object(server.to_entry()));
    }
    map
}
