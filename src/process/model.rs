//! The portable process record and the process table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::process::identity::Resolution;
use crate::process::stat::ProcessStat;

/// Mapping of process ID to its record. Keys are unique, order is unspecified.
pub type ProcessTable = HashMap<u32, Process>;

/// One process as seen during a scan.
///
/// Built fresh for every scan and never modified afterwards. Fields that
/// could not be resolved carry [`Resolution::Denied`] or
/// [`Resolution::Unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: u32,
    /// Hex SHA-256 of the executable's contents.
    pub binary_sha: Resolution<String>,
    /// Executable base name, or the stat file name when the executable is unknown.
    pub command_name: String,
    pub command_path: Resolution<PathBuf>,
    /// Arguments after argv[0] from `/proc/<pid>/cmdline`.
    pub command_args: Vec<String>,
    pub parent_process: u32,
    pub is_kernel_task: bool,
    pub has_permission: bool,
    /// Linux stat record the process was built from.
    pub stat: ProcessStat,
}

impl Process {
    /// The binary digest, if it was resolved and is non-empty.
    pub fn checksum(&self) -> Option<&str> {
        self.binary_sha
            .resolved()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Arguments joined by spaces, as a shell would display them.
    pub fn flags_and_args(&self) -> String {
        self.command_args.join(" ")
    }
}
