//! High-level commands for mcpick operations.
//!
//! Commands take already-collected input and do the work; prompting stays in
//! the CLI frontend.

pub mod add;
pub mod backup;
pub mod edit;
pub mod profile;

pub use add::{
    AddCommand, AddOptions, AddReport, ServerForm, parse_args_input, parse_json_input,
    parse_pairs_input,
};
pub use backup::{BackupCommand, RestoreReport};
pub use edit::{AvailableServers, EditCommand, EditOptions, EditReport};
pub use profile::{ApplyReport, ProfileCommand};
