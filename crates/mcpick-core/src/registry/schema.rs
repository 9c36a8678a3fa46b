//! Server registry file schema
//!
//! The registry is the catalog of every known server definition, independent
//! of which ones are currently enabled.

use serde::{Deserialize, Serialize};

use crate::mcp::ServerDefinition;

/// Contents of `servers.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub servers: Vec<ServerDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ServerDefinition> {
        self.servers.iter().find(|server| server.name == name)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Replace the entry with the same name in place, or append.
    pub fn upsert(&mut self, definition: ServerDefinition) {
        match self
            .servers
            .iter_mut()
            .find(|server| server.name == definition.name)
        {
            Some(existing) => *existing = definition,
            None => self.servers.push(definition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut registry = Registry::new();
        registry.upsert(ServerDefinition::stdio("a", "one", vec![]));
        registry.upsert(ServerDefinition::stdio("b", "two", vec![]));
        registry.upsert(ServerDefinition::stdio("a", "three", vec![]));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.servers[0].command(), Some("three"));
        assert_eq!(registry.servers[1].name, "b");
    }

    #[test]
    fn test_registry_file_rejects_invalid_server() {
        let result: Result<Registry, _> =
            serde_json::from_str(r#"{"servers": [{"name": "x", "type": "sse"}]}"#);
        assert!(result.is_err());
    }
}
