//! Process discovery and load-time filtering.
//!
//! This module scans the procfs root for numeric process directories and
//! decides which loaded processes belong in the table.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InspectError, Result};
use crate::process::model::Process;

/// Process entry representing a directory in the procfs root.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Scans `root` for process entries with numeric PIDs.
///
/// Non-numeric entries (`self`, `sys`, `meminfo`, ...) are skipped. Failing
/// to list `root` itself is the only error.
pub fn collect_proc_entries(root: &Path) -> Result<Vec<ProcEntry>> {
    let entries = fs::read_dir(root).map_err(|source| InspectError::Enumeration {
        path: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let p = entry.path();
        let name = match p.file_name().and_then(|s| s.to_str()) {
            Some(v) => v,
            None => continue,
        };
        if !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !p.is_dir() {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        out.push(ProcEntry { pid, proc_path: p });
    }
    Ok(out)
}

/// Load-time inclusion policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub include_kernel: bool,
    pub include_permission_issues: bool,
}

/// Determines if a process should be kept in the table.
pub fn should_include_process(p: &Process, filter: ScanFilter) -> bool {
    if p.is_kernel_task && !filter.include_kernel {
        return false;
    }
    if !p.has_permission && !filter.include_permission_issues {
        return false;
    }
    true
}
