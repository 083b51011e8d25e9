//! Tiered process store.
//!
//! Lookups try, in order, the in-memory table, the on-disk snapshot and a
//! live scan of procfs. Only a live scan touches `/proc/<pid>` directories.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::error::{InspectError, Result};
use crate::process::{
    collect_proc_entries, load_process, should_include_process, BinaryHasher, HashMemo, Process,
    ProcessTable, ScanFilter, Sha256Hasher,
};
use crate::snapshot::{
    clear_snapshot, default_cache_dir, read_snapshot, write_snapshot, SNAPSHOT_FILE_NAME,
};

/// Default procfs mount point.
pub const DEFAULT_PROCFS: &str = "/proc";

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Root of the process-info filesystem.
    pub procfs_path: PathBuf,
    /// Directory holding the snapshot file.
    pub cache_dir: PathBuf,
    /// Skip reading and writing the snapshot entirely.
    pub ignore_cache: bool,
    /// Keep kernel tasks in the table.
    pub include_kernel: bool,
    /// Keep processes whose executable could not be inspected.
    pub include_permission_issues: bool,
    /// Worker threads for a live scan. `None` uses the global rayon pool.
    pub parallelism: Option<usize>,
    /// Upper bound on the duration of a live scan.
    pub scan_timeout: Option<Duration>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            procfs_path: PathBuf::from(DEFAULT_PROCFS),
            cache_dir: default_cache_dir(),
            ignore_cache: false,
            include_kernel: false,
            include_permission_issues: false,
            parallelism: None,
            scan_timeout: None,
        }
    }
}

impl InspectorConfig {
    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE_NAME)
    }

    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter {
            include_kernel: self.include_kernel,
            include_permission_issues: self.include_permission_issues,
        }
    }
}

/// Operations of a process store.
pub trait Inspector {
    /// Discards the in-memory table, rescans procfs and refreshes the
    /// snapshot unless caching is disabled.
    fn load_processes(&mut self) -> Result<()>;

    /// Deletes the snapshot. The in-memory table is kept.
    fn clear_process_cache(&mut self) -> Result<()>;

    /// Returns the table from the first tier that has one.
    fn get_processes(&mut self) -> Result<&ProcessTable>;

    /// When the table currently in memory was scanned.
    fn last_load_time(&self) -> Option<DateTime<Utc>>;
}

/// Process store backed by a Linux procfs tree.
pub struct LinuxInspector {
    config: InspectorConfig,
    hasher: Arc<dyn BinaryHasher>,
    processes: Option<ProcessTable>,
    loaded_at: Option<DateTime<Utc>>,
}

impl LinuxInspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self::with_hasher(config, Arc::new(Sha256Hasher))
    }

    /// Creates a store that digests executables with `hasher`.
    pub fn with_hasher(config: InspectorConfig, hasher: Arc<dyn BinaryHasher>) -> Self {
        Self {
            config,
            hasher,
            processes: None,
            loaded_at: None,
        }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.config.snapshot_path()
    }

    fn scan(&self) -> Result<(ProcessTable, DateTime<Utc>)> {
        let scanned_at = Utc::now();
        let table = scan_processes(&self.config, self.hasher.as_ref())?;
        Ok((table, scanned_at))
    }

    fn persist(&self) -> Result<()> {
        match &self.processes {
            Some(table) => write_snapshot(
                &self.snapshot_path(),
                self.loaded_at.unwrap_or_else(Utc::now),
                table,
            ),
            None => Err(InspectError::NoProcessTable),
        }
    }
}

impl Inspector for LinuxInspector {
    fn load_processes(&mut self) -> Result<()> {
        // A failed scan leaves the previous table in place.
        let (table, scanned_at) = self.scan()?;
        self.processes = Some(table);
        self.loaded_at = Some(scanned_at);

        if !self.config.ignore_cache {
            self.persist()?;
        }
        Ok(())
    }

    fn clear_process_cache(&mut self) -> Result<()> {
        clear_snapshot(&self.snapshot_path())
    }

    fn get_processes(&mut self) -> Result<&ProcessTable> {
        if self.processes.is_none() && !self.config.ignore_cache {
            if let Some(snapshot) = read_snapshot(&self.snapshot_path()) {
                if snapshot.processes.is_empty() {
                    debug!("Ignoring empty process snapshot");
                } else {
                    debug!(
                        "Loaded {} processes from snapshot scanned at {}",
                        snapshot.processes.len(),
                        snapshot.scanned_at
                    );
                    self.processes = Some(snapshot.processes);
                    self.loaded_at = Some(snapshot.scanned_at);
                }
            }
        }

        if self.processes.is_none() {
            let (table, scanned_at) = self.scan()?;
            self.processes = Some(table);
            self.loaded_at = Some(scanned_at);

            if !self.config.ignore_cache {
                if let Err(e) = self.persist() {
                    warn!("Failed to persist process snapshot: {}", e);
                }
            }
        }

        self.processes.as_ref().ok_or(InspectError::NoProcessTable)
    }

    fn last_load_time(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

/// Scans procfs and builds a filtered process table.
///
/// Every process is loaded with one shared [`HashMemo`], so an executable
/// shared by several processes is hashed once. Loading runs on a dedicated
/// pool of `parallelism` threads when configured.
#[instrument(skip(config, hasher), fields(procfs = %config.procfs_path.display()))]
pub fn scan_processes(config: &InspectorConfig, hasher: &dyn BinaryHasher) -> Result<ProcessTable> {
    let started = Instant::now();
    let entries = collect_proc_entries(&config.procfs_path)?;
    let memo = HashMemo::new(hasher);
    let deadline = config.scan_timeout.map(|limit| (started + limit, limit));

    let load_all = || -> Result<Vec<Process>> {
        entries
            .par_iter()
            .map(|entry| {
                if let Some((deadline, limit)) = deadline {
                    if Instant::now() >= deadline {
                        return Err(InspectError::ScanTimedOut(limit));
                    }
                }
                Ok(load_process(entry.pid, &entry.proc_path, &memo))
            })
            .collect()
    };

    let loaded = match config.parallelism {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("proctor-scan-{}", i))
            .build()?
            .install(load_all)?,
        None => load_all()?,
    };

    let filter = config.scan_filter();
    let found = loaded.len();
    let table: ProcessTable = loaded
        .into_iter()
        .filter(|p| should_include_process(p, filter))
        .map(|p| (p.id, p))
        .collect();

    info!(
        "Scanned {} processes ({} kept, {} distinct executables) in {:.3}s",
        found,
        table.len(),
        memo.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(table)
}
