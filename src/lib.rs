//! Proctor Process Inspection Library
//!
//! This library inspects the processes of a Linux host through procfs and
//! keeps the result in a tiered store, so repeated queries do not rescan the
//! system.
//!
//! # Features
//!
//! - **Stat Parsing**: Positional decoding of `/proc/<pid>/stat`, including
//!   command names containing spaces and parentheses
//! - **Binary Identity**: Executable path and SHA-256 of its contents, hashed
//!   once per path per scan
//! - **Tiered Store**: In-memory table, on-disk snapshot, then live scan
//! - **Ancestry**: Parent chains from any process up to the root
//! - **Fingerprints**: One digest over the binaries of a process lineage
//!
//! # Usage
//!
//! ```rust,no_run
//! use proctor::{fingerprint_process, resolve_ancestry, Inspector, InspectorConfig, LinuxInspector};
//!
//! let mut inspector = LinuxInspector::new(InspectorConfig::default());
//! let processes = inspector.get_processes()?;
//!
//! let chain = resolve_ancestry(processes, std::process::id())?;
//! println!("lineage: {:?}", chain.pids());
//!
//! let fp = fingerprint_process(processes, std::process::id())?;
//! println!("fingerprint: {}", fp);
//! # Ok::<(), proctor::InspectError>(())
//! ```

pub mod ancestry;
pub mod error;
pub mod fingerprint;
pub mod inspector;
pub mod process;
pub mod snapshot;

// Re-export main types for convenience
pub use ancestry::{
    find_processes_by_name, resolve_ancestry, resolve_ancestry_by_name, AncestryChain,
    AncestryEnd, ProcessRelation,
};
pub use error::{InspectError, Result};
pub use fingerprint::{fingerprint, fingerprint_process};
pub use inspector::{scan_processes, Inspector, InspectorConfig, LinuxInspector};
pub use process::{
    BinaryHasher, Process, ProcessStat, ProcessTable, Resolution, Sha256Hasher,
};
pub use snapshot::{Snapshot, SNAPSHOT_FILE_NAME};
