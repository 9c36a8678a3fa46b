//! Local catalog of known MCP server definitions
//!
//! The registry is a superset of what is enabled: disabling a server never
//! removes it from here.

pub mod schema;
pub mod store;

pub use schema::Registry;
pub use store::ServerRegistry;
