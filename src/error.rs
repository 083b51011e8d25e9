//! Error types for process inspection.
//!
//! Only conditions the caller has to act on are errors. Failures reading a
//! single process's files are recorded on that [`crate::Process`] instead.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for inspector operations.
pub type Result<T> = std::result::Result<T, InspectError>;

/// Unified error type for the inspector, ancestry and fingerprint operations.
#[derive(Error, Debug)]
pub enum InspectError {
    // Enumeration and scanning
    #[error("failed to enumerate processes under {}: {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("process scan exceeded the configured timeout of {0:?}")]
    ScanTimedOut(Duration),

    #[error("failed to build scan worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no process table was produced by any load tier")]
    NoProcessTable,

    // Snapshot persistence
    #[error("failed persisting process snapshot to {}: {source}", path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed encoding process snapshot: {0}")]
    SnapshotEncode(#[from] bincode::Error),

    #[error("failed to clear the existing process snapshot {}: {source}", path.display())]
    SnapshotClear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Lookups
    #[error("failed to find process with id: {pid}")]
    ProcessNotFound { pid: u32 },

    #[error("no process named {name:?} found")]
    ProcessNameNotFound { name: String },

    #[error("process name {name:?} is ambiguous, matching pids: {pids:?}")]
    AmbiguousProcessName { name: String, pids: Vec<u32> },

    // Fingerprint preconditions
    #[error("process {pid} could not be introspected due to missing permissions, so no fingerprint can be generated")]
    MissingPermission { pid: u32 },

    #[error("process {pid} is missing details about its binary checksum")]
    MissingChecksum { pid: u32 },

    #[error("could not gather details on parent process {parent} of process {pid}")]
    MissingAncestor { pid: u32, parent: u32 },

    #[error("parent links of process {pid} form a cycle")]
    CyclicAncestry { pid: u32 },
}

impl InspectError {
    /// Returns true for lookups that failed because the process does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InspectError::ProcessNotFound { .. } | InspectError::ProcessNameNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(InspectError::ProcessNotFound { pid: 4 }.is_not_found());
        assert!(InspectError::ProcessNameNotFound {
            name: "sshd".into()
        }
        .is_not_found());
        assert!(!InspectError::MissingChecksum { pid: 4 }.is_not_found());
    }

    #[test]
    fn test_error_messages_name_the_process() {
        let msg = InspectError::MissingPermission { pid: 812 }.to_string();
        assert!(msg.contains("812"));

        let msg = InspectError::AmbiguousProcessName {
            name: "bash".into(),
            pids: vec![10, 11],
        }
        .to_string();
        assert!(msg.contains("bash"));
        assert!(msg.contains("11"));

        let msg = InspectError::MissingAncestor { pid: 99, parent: 50 }.to_string();
        assert!(msg.contains("99") && msg.contains("50"));
    }

    #[test]
    fn test_no_process_table_message() {
        let msg = InspectError::NoProcessTable.to_string();
        assert!(msg.contains("no process table"));
        assert!(!msg.contains("empty"));
    }
}
