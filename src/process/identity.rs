//! Executable identity resolution: the `exe` link and the binary's content hash.
//!
//! Failures are classified rather than propagated. A process whose link is
//! denied is still reported, with [`Resolution::Denied`] in place of the path
//! and hash, and a missing link marks a kernel task.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Symbolic link to the running executable inside a process directory.
pub const EXE_LINK: &str = "exe";

/// Text shown for values that could not be read due to permissions.
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";

/// Text shown for values that could not be read for any other reason.
pub const STAT_ERROR: &str = "STAT_ERROR";

/// Outcome of resolving one field of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution<T> {
    Resolved(T),
    Denied,
    Unavailable,
}

impl<T> Resolution<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Resolution::Denied)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resolution<U> {
        match self {
            Resolution::Resolved(v) => Resolution::Resolved(f(v)),
            Resolution::Denied => Resolution::Denied,
            Resolution::Unavailable => Resolution::Unavailable,
        }
    }

    fn sentinel(&self) -> Option<&'static str> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Denied => Some(PERMISSION_DENIED),
            Resolution::Unavailable => Some(STAT_ERROR),
        }
    }
}

impl fmt::Display for Resolution<String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Resolved(v) => f.write_str(v),
            other => f.write_str(other.sentinel().unwrap_or_default()),
        }
    }
}

impl Resolution<PathBuf> {
    /// Renders the path, or the sentinel text when it was not resolved.
    pub fn display(&self) -> String {
        match self {
            Resolution::Resolved(p) => p.to_string_lossy().into_owned(),
            other => other.sentinel().unwrap_or_default().to_string(),
        }
    }
}

/// Result of reading `/proc/<pid>/exe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExeLink {
    /// The link target, the executable's path.
    Path(PathBuf),
    /// Reading the link was refused.
    Denied,
    /// The link has no target, which is the case for kernel tasks.
    Missing,
    /// Any other failure.
    Unreadable,
}

/// Reads the `exe` link of the process directory at `proc_path`.
pub fn resolve_exe(proc_path: &Path) -> ExeLink {
    match fs::read_link(proc_path.join(EXE_LINK)) {
        Ok(target) => ExeLink::Path(target),
        Err(e) => match e.kind() {
            ErrorKind::PermissionDenied => ExeLink::Denied,
            ErrorKind::NotFound => ExeLink::Missing,
            _ => {
                debug!("Failed to read exe link in {}: {}", proc_path.display(), e);
                ExeLink::Unreadable
            }
        },
    }
}

/// Computes the content digest of an executable.
pub trait BinaryHasher: Send + Sync {
    fn hash_file(&self, path: &Path) -> io::Result<String>;
}

/// Lowercase hex SHA-256 of the file contents, streamed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl BinaryHasher for Sha256Hasher {
    fn hash_file(&self, path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Per-scan memo of executable digests keyed by path.
///
/// Each path is hashed at most once, even when processes are loaded on
/// several threads: the first caller for a path initializes its cell and
/// concurrent callers for the same path wait for that result.
pub struct HashMemo<'a> {
    hasher: &'a dyn BinaryHasher,
    digests: DashMap<PathBuf, Arc<OnceCell<Resolution<String>>>>,
}

impl<'a> HashMemo<'a> {
    pub fn new(hasher: &'a dyn BinaryHasher) -> Self {
        Self {
            hasher,
            digests: DashMap::new(),
        }
    }

    /// Returns the digest of the file at `path`, hashing it on first use.
    pub fn digest(&self, path: &Path) -> Resolution<String> {
        if let Some(cell) = self.digests.get(path) {
            if let Some(done) = cell.get() {
                return done.clone();
            }
        }

        // The shard lock is released at the end of this statement, before hashing.
        let cell = Arc::clone(&self.digests.entry(path.to_path_buf()).or_default());
        cell.get_or_init(|| self.compute(path)).clone()
    }

    /// Number of distinct paths seen during this scan.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    fn compute(&self, path: &Path) -> Resolution<String> {
        match self.hasher.hash_file(path) {
            Ok(digest) => Resolution::Resolved(digest),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                debug!("Permission denied hashing {}", path.display());
                Resolution::Denied
            }
            Err(e) => {
                debug!("Failed to hash {}: {}", path.display(), e);
                Resolution::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingHasher {
        calls: AtomicUsize,
    }

    impl BinaryHasher for CountingHasher {
        fn hash_file(&self, path: &Path) -> io::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Sha256Hasher.hash_file(path)
        }
    }

    #[test]
    fn test_sha256_hasher_known_digest() {
        let dir = tempdir().expect("Failed to create temp dir");
        let bin = dir.path().join("bin");
        fs::write(&bin, b"abc").expect("Failed to write binary");

        let digest = Sha256Hasher.hash_file(&bin).expect("hash should succeed");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_memo_hashes_each_path_once() {
        let dir = tempdir().expect("Failed to create temp dir");
        let bin = dir.path().join("shared");
        fs::write(&bin, b"#!/bin/true").expect("Failed to write binary");

        let hasher = CountingHasher {
            calls: AtomicUsize::new(0),
        };
        let memo = HashMemo::new(&hasher);

        let first = memo.digest(&bin);
        let second = memo.digest(&bin);

        assert!(first.is_resolved());
        assert_eq!(first, second);
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_hash_memo_missing_file_is_unavailable() {
        let memo = HashMemo::new(&Sha256Hasher);
        let digest = memo.digest(Path::new("/nonexistent/proctor/binary"));
        assert_eq!(digest, Resolution::Unavailable);
    }

    #[test]
    fn test_resolve_exe_link() {
        let dir = tempdir().expect("Failed to create temp dir");
        let bin = dir.path().join("app");
        fs::write(&bin, b"app").expect("Failed to write binary");

        let with_link = dir.path().join("100");
        fs::create_dir(&with_link).expect("Failed to create proc dir");
        std::os::unix::fs::symlink(&bin, with_link.join(EXE_LINK)).expect("symlink");
        assert_eq!(resolve_exe(&with_link), ExeLink::Path(bin));

        let kernel = dir.path().join("2");
        fs::create_dir(&kernel).expect("Failed to create proc dir");
        assert_eq!(resolve_exe(&kernel), ExeLink::Missing);
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(Resolution::Resolved("abc".to_string()).to_string(), "abc");
        assert_eq!(Resolution::<String>::Denied.to_string(), PERMISSION_DENIED);
        assert_eq!(Resolution::<String>::Unavailable.to_string(), STAT_ERROR);
        assert_eq!(
            Resolution::Resolved(PathBuf::from("/usr/bin/sh")).display(),
            "/usr/bin/sh"
        );
        assert_eq!(Resolution::<PathBuf>::Denied.display(), PERMISSION_DENIED);
    }
}
