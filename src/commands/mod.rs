//! CLI command implementations for proctor.
//!
//! This module provides implementations for all CLI subcommands:
//! - `list`: All processes
//! - `get`: One process by id or name
//! - `tree`: Ancestry of a process
//! - `fingerprint`: Lineage digest of a process
//! - `cache`: Snapshot refresh and removal
//! - `check`: System validation
//! - `config`: Configuration file generation
//! - `ui`: Web UI server

pub mod cache;
pub mod check;
pub mod config;
pub mod fingerprint;
pub mod get;
pub mod list;
pub mod tree;
pub mod ui;

use proctor::{InspectorConfig, LinuxInspector};

use crate::config::Config;

// Re-export command functions
pub use cache::{command_clear_cache, command_refresh};
pub use check::command_check;
pub use config::command_config;
pub use fingerprint::command_fingerprint;
pub use get::command_get;
pub use list::command_list;
pub use tree::command_tree;
pub use ui::command_ui;

/// Creates the process store described by the effective configuration.
pub fn open_inspector(config: &Config) -> LinuxInspector {
    let inspector_config: InspectorConfig = config.inspector_config();
    LinuxInspector::new(inspector_config)
}
