//! HTTP endpoint handlers for the web UI.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Process list
//! - `/process/{pid}`: Process details
//! - `/tree/{pid}`: Ancestry and fingerprint
//! - `/refresh`: Snapshot reset and rescan

pub mod html;
pub mod index;
pub mod process;
pub mod refresh;
pub mod tree;

// Re-export handlers
pub use index::index_handler;
pub use process::process_handler;
pub use refresh::refresh_handler;
pub use tree::tree_handler;
