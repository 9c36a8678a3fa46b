//! MCP server definitions and their validation

pub mod schema;
pub mod validation;

pub use schema::{ServerDefinition, Transport, TransportType, servers_to_map};
pub use validation::{ValidationError, validate_entry, validate_server, validate_servers_map};
