//! On-disk snapshot of the process table.
//!
//! The snapshot is the second lookup tier between the in-memory table and a
//! live scan. It is a bincode encoding of [`Snapshot`], written to a temporary
//! file and renamed into place so readers never observe a partial write.
//! Anything that does not decode cleanly is treated as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{InspectError, Result};
use crate::process::ProcessTable;

/// File name of the snapshot inside the cache directory.
pub const SNAPSHOT_FILE_NAME: &str = "proc.cache";

/// Bumped whenever the encoded layout of [`Snapshot`] changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Application directory name under the user data directory.
const APP_DIR_NAME: &str = "proctor";

/// A persisted process table together with the time it was scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    pub scanned_at: DateTime<Utc>,
    pub processes: ProcessTable,
}

// Same field order as `Snapshot`, so both encode identically.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    scanned_at: DateTime<Utc>,
    processes: &'a ProcessTable,
}

/// Default snapshot directory: `<data dir>/proctor`, or `./.proctor` when the
/// platform has no data directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR_NAME)))
}

/// Reads and decodes the snapshot at `path`.
///
/// Returns `None` when the file is absent, empty, truncated, undecodable or
/// written by a different format version.
pub fn read_snapshot(path: &Path) -> Option<Snapshot> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No process snapshot at {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Failed to read process snapshot {}: {}", path.display(), e);
            return None;
        }
    };

    if bytes.is_empty() {
        debug!("Process snapshot {} is empty", path.display());
        return None;
    }

    let snapshot: Snapshot = match bincode::deserialize(&bytes) {
        Ok(s) => s,
        Err(e) => {
            warn!("Discarding unreadable process snapshot {}: {}", path.display(), e);
            return None;
        }
    };

    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        info!(
            "Discarding process snapshot {} with format version {} (expected {})",
            path.display(),
            snapshot.format_version,
            SNAPSHOT_FORMAT_VERSION
        );
        return None;
    }

    Some(snapshot)
}

/// Persists `processes` to `path`, replacing any previous snapshot.
///
/// Parent directories are created as needed.
pub fn write_snapshot(
    path: &Path,
    scanned_at: DateTime<Utc>,
    processes: &ProcessTable,
) -> Result<()> {
    let encoded = bincode::serialize(&SnapshotRef {
        format_version: SNAPSHOT_FORMAT_VERSION,
        scanned_at,
        processes,
    })?;

    let write_err = |source: std::io::Error| InspectError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("cache.tmp");
    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(write_err)?;
        file.write_all(&encoded).map_err(write_err)?;
        file.flush().map_err(write_err)?;
    }
    fs::rename(&tmp_path, path).map_err(write_err)?;

    debug!(
        "Persisted {} processes to {} ({} bytes)",
        processes.len(),
        path.display(),
        encoded.len()
    );
    Ok(())
}

/// Deletes the snapshot at `path`. An absent snapshot is not an error.
pub fn clear_snapshot(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Cleared process snapshot {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(InspectError::SnapshotClear {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{parse_stat, Process, Resolution};
    use tempfile::tempdir;

    fn sample_table() -> ProcessTable {
        let stat = parse_stat(b"1002 (tmux: server) S 898 898 898 0 -1 4194304 9075 31619 19 0 242 54 42 7 20 0 3 0 4316 499617792 14545 18446744073709551615 94657007656960 94657008059597 140727172487872 0 0 0 0 4096 0 0 0 0 17 10 0 0 0 0 0 94657008206176 94657008240992 94657028120576 140727172496280 140727172496349 140727172496349 140727172497384 0\n");
        let p = Process {
            id: 1002,
            binary_sha: Resolution::Resolved("ab".repeat(32)),
            command_name: "tmux".into(),
            command_path: Resolution::Resolved(PathBuf::from("/usr/bin/tmux")),
            command_args: vec!["new".into(), "-s".into(), "work".into()],
            parent_process: 898,
            is_kernel_task: false,
            has_permission: true,
            stat,
        };
        let denied = Process {
            id: 898,
            binary_sha: Resolution::Denied,
            command_name: "(systemd)".into(),
            command_path: Resolution::Denied,
            command_args: Vec::new(),
            parent_process: 1,
            is_kernel_task: false,
            has_permission: false,
            stat: Default::default(),
        };
        ProcessTable::from([(p.id, p), (denied.id, denied)])
    }

    #[test]
    fn test_snapshot_write_then_read() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested/dir").join(SNAPSHOT_FILE_NAME);
        let table = sample_table();
        let scanned_at = Utc::now();

        write_snapshot(&path, scanned_at, &table).expect("write should succeed");
        assert!(path.exists());
        assert!(!path.with_extension("cache.tmp").exists());

        let snapshot = read_snapshot(&path).expect("snapshot should decode");
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.scanned_at, scanned_at);
        assert_eq!(snapshot.processes, table);
    }

    #[test]
    fn test_snapshot_overwrites_previous() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(SNAPSHOT_FILE_NAME);

        write_snapshot(&path, Utc::now(), &sample_table()).expect("first write");
        write_snapshot(&path, Utc::now(), &ProcessTable::new()).expect("second write");

        let snapshot = read_snapshot(&path).expect("snapshot should decode");
        assert!(snapshot.processes.is_empty());
    }

    #[test]
    fn test_read_snapshot_missing_empty_and_truncated() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(SNAPSHOT_FILE_NAME);
        assert!(read_snapshot(&path).is_none());

        fs::write(&path, b"").expect("Failed to write file");
        assert!(read_snapshot(&path).is_none());

        write_snapshot(&path, Utc::now(), &sample_table()).expect("write should succeed");
        let bytes = fs::read(&path).expect("Failed to read snapshot");
        fs::write(&path, &bytes[..bytes.len() / 2]).expect("Failed to truncate");
        assert!(read_snapshot(&path).is_none());
    }

    #[test]
    fn test_read_snapshot_rejects_other_version() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(SNAPSHOT_FILE_NAME);
        let old = Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION + 1,
            scanned_at: Utc::now(),
            processes: sample_table(),
        };
        fs::write(&path, bincode::serialize(&old).expect("encode")).expect("Failed to write");

        assert!(read_snapshot(&path).is_none());
    }

    #[test]
    fn test_clear_snapshot() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(SNAPSHOT_FILE_NAME);

        clear_snapshot(&path).expect("clearing an absent snapshot is fine");

        write_snapshot(&path, Utc::now(), &sample_table()).expect("write should succeed");
        clear_snapshot(&path).expect("clear should succeed");
        assert!(!path.exists());
    }

    #[test]
    fn test_default_cache_dir_ends_with_app_name() {
        let dir = default_cache_dir();
        let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("");
        assert!(name == "proctor" || name == ".proctor");
    }
}
