//! Process-related modules for parsing, identity and loading.
//!
//! This module provides:
//! - `stat`: Positional parsing of /proc/<pid>/stat
//! - `identity`: Executable path and content hash resolution
//! - `loader`: Assembly of one process record
//! - `scanner`: Process discovery and filtering
//! - `model`: The process record and table types

pub mod identity;
pub mod loader;
pub mod model;
pub mod scanner;
pub mod stat;

// Re-export commonly used types
pub use identity::{
    resolve_exe, BinaryHasher, ExeLink, HashMemo, Resolution, Sha256Hasher, PERMISSION_DENIED,
    STAT_ERROR,
};
pub use loader::{load_process, read_command_args};
pub use model::{Process, ProcessTable};
pub use scanner::{collect_proc_entries, should_include_process, ProcEntry, ScanFilter};
pub use stat::{parse_stat, read_stat_file, ProcessStat, CLK_TCK};
