//! Check command implementation.
//!
//! Validates procfs access, privileges, the snapshot location and the
//! configuration.

use proctor::process::collect_proc_entries;
use proctor::snapshot::read_snapshot;
use std::fs;

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::{check_proc_access, check_user_privileges};

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Proctor - System Check");
    println!("=========================");

    let inspector_config = config.inspector_config();
    let procfs = &inspector_config.procfs_path;
    let mut all_ok = true;

    // Check procfs
    println!("\n📁 Checking {} ...", procfs.display());
    match collect_proc_entries(procfs) {
        Ok(entries) if entries.is_empty() => {
            println!("   ❌ No process entries found");
            all_ok = false;
        }
        Ok(entries) => {
            println!("   ✅ Can list {} process entries", entries.len());
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    // Check privileges
    println!("\n🔐 Checking privileges...");
    if check_user_privileges() {
        println!("   ✅ Running as root");
    } else {
        println!("   ⚠️  Not running as root - some executables cannot be hashed");
    }
    match check_proc_access(procfs) {
        Ok(_) => println!("   ✅ Executable links are readable"),
        Err(e) => println!("   ⚠️  {}", e),
    }

    // Check snapshot location
    let snapshot = inspector_config.snapshot_path();
    println!("\n💾 Checking snapshot location...");
    if inspector_config.ignore_cache {
        println!("   ℹ️  Cache disabled (ignore_cache)");
    } else {
        println!("   📄 {}", snapshot.display());
        match read_snapshot(&snapshot) {
            Some(s) => println!(
                "   ✅ Snapshot with {} processes, scanned at {}",
                s.processes.len(),
                s.scanned_at
            ),
            None => println!("   ℹ️  No usable snapshot yet"),
        }
        match fs::create_dir_all(&inspector_config.cache_dir) {
            Ok(()) if is_writable(&inspector_config.cache_dir) => {
                println!("   ✅ Cache directory is writable")
            }
            Ok(()) => {
                println!("   ❌ Cache directory is not writable");
                all_ok = false;
            }
            Err(e) => {
                println!("   ❌ Cannot create cache directory: {}", e);
                all_ok = false;
            }
        }
    }

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}

fn is_writable(dir: &std::path::Path) -> bool {
    nix::unistd::access(dir, nix::unistd::AccessFlags::W_OK).is_ok()
}
