//! Cache command implementations.
//!
//! `refresh` forces a live scan and rewrites the snapshot, `clear-cache`
//! removes the snapshot.

use proctor::Inspector;
use std::time::Instant;

use crate::commands::open_inspector;
use crate::config::Config;

/// Rescans all processes and persists a fresh snapshot.
pub fn command_refresh(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut inspector = open_inspector(config);
    let started = Instant::now();

    inspector.load_processes()?;
    let count = inspector.get_processes()?.len();

    println!(
        "✅ Loaded {} processes in {:.2}s",
        count,
        started.elapsed().as_secs_f64()
    );
    if inspector.config().ignore_cache {
        println!("   Snapshot not written (cache disabled)");
    } else {
        println!("   Snapshot written to: {}", inspector.snapshot_path().display());
    }
    Ok(())
}

/// Deletes the process snapshot.
pub fn command_clear_cache(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut inspector = open_inspector(config);
    let path = inspector.snapshot_path();
    let existed = path.exists();

    inspector.clear_process_cache()?;

    if existed {
        println!("✅ Snapshot removed: {}", path.display());
    } else {
        println!("✅ No snapshot present at: {}", path.display());
    }
    Ok(())
}
