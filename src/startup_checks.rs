//! Runtime requirement validation for proctor.
//!
//! This module checks that procfs can be read and that the current user can
//! inspect executables of processes it does not own.

use nix::unistd::geteuid;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error, info, warn};

use proctor::process::identity::EXE_LINK;

/// Validate all runtime requirements
pub fn validate_requirements(procfs: &Path) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    check_proc_access(procfs)?;

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Returns true when running as root.
pub fn check_user_privileges() -> bool {
    if !geteuid().is_root() {
        warn!("⚠️  Not running as root - executables of other users' processes cannot be hashed");
        warn!("   Recommendation: Run as root, or pass --include-permission-issues to list them anyway");
        false
    } else {
        info!("✅ Running as root (uid=0)");
        true
    }
}

/// Check procfs access using the init process
pub fn check_proc_access(procfs: &Path) -> Result<(), ValidationError> {
    if !procfs.is_dir() {
        error!("❌ {} is not a directory", procfs.display());
        return Err(ValidationError::ProcfsUnavailable(procfs.display().to_string()));
    }

    let test_link = procfs.join("1").join(EXE_LINK);
    match fs::read_link(&test_link) {
        Ok(target) => {
            debug!("{} -> {}", test_link.display(), target.display());
            info!("✅ procfs access: Can inspect all processes");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            error!("❌ Cannot read {} - insufficient permissions", test_link.display());
            error!("   Only processes owned by the current user will be fully inspected!");
            error!("");
            error!("   Solutions:");
            error!("   1. Run as root: sudo proctor ...");
            error!("   2. Grant capabilities:");
            error!("      setcap cap_dac_read_search,cap_sys_ptrace+ep /path/to/proctor");
            Err(ValidationError::InsufficientPermissions(e.to_string()))
        }
        Err(e) => {
            warn!("⚠️  Could not test procfs access: {}", e);
            Ok(()) // Continue but warn
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("procfs not available at {0}")]
    ProcfsUnavailable(String),
}
