//! Assembly of one [`Process`] from its procfs directory.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::process::identity::{resolve_exe, ExeLink, HashMemo, Resolution};
use crate::process::model::Process;
use crate::process::stat::read_stat_file;

/// Command line file inside a process directory.
pub const CMDLINE_FILE: &str = "cmdline";

/// Reads argv[1..] from `cmdline`. Kernel tasks and unreadable files yield
/// no arguments.
pub fn read_command_args(proc_path: &Path) -> Vec<String> {
    match fs::read(proc_path.join(CMDLINE_FILE)) {
        Ok(content) => content
            .split(|&b| b == 0u8)
            .skip(1)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect(),
        Err(e) => {
            debug!("Failed to read cmdline in {}: {}", proc_path.display(), e);
            Vec::new()
        }
    }
}

/// Builds the record for `pid`, whose directory is `proc_path`.
///
/// Never fails. Unreadable parts of the process degrade to
/// [`Resolution::Denied`] / [`Resolution::Unavailable`] or a zero-value stat.
pub fn load_process(pid: u32, proc_path: &Path, memo: &HashMemo<'_>) -> Process {
    let stat = read_stat_file(proc_path).unwrap_or_else(|e| {
        debug!("Failed to read stat for pid {}: {}", pid, e);
        Default::default()
    });

    let mut is_kernel_task = false;
    let mut has_permission = true;

    let (command_path, binary_sha) = match resolve_exe(proc_path) {
        ExeLink::Path(path) => {
            let sha = memo.digest(&path);
            if sha.is_denied() {
                has_permission = false;
            }
            (Resolution::Resolved(path), sha)
        }
        ExeLink::Denied => {
            has_permission = false;
            (Resolution::Denied, Resolution::Denied)
        }
        ExeLink::Missing => {
            is_kernel_task = true;
            (Resolution::Unavailable, Resolution::Unavailable)
        }
        ExeLink::Unreadable => (Resolution::Unavailable, Resolution::Unavailable),
    };

    let command_name = command_path
        .resolved()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| stat.file_name.clone());

    Process {
        id: pid,
        binary_sha,
        command_name,
        command_path,
        command_args: read_command_args(proc_path),
        parent_process: stat.parent_id,
        is_kernel_task,
        has_permission,
        stat,
    }
}
