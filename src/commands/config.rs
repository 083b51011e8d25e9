//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(default_file_name(&format)),
    };

    let mut content = render_config(&config, format.clone())?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

fn default_file_name(format: &ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Yaml => "proctor.yaml",
        ConfigFormat::Json => "proctor.json",
        ConfigFormat::Toml => "proctor.toml",
    }
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Proctor Configuration
# ======================
#
# Process Store
# -------------
# procfs_path: "/proc"             # Root of the process filesystem
# cache_dir: null                  # Snapshot directory (null = <data dir>/proctor)
# ignore_cache: false              # Never read or write the snapshot
#
# Load-time Filters
# -----------------
# include_kernel: false            # Keep kernel tasks (no executable)
# include_permission_issues: false # Keep processes whose executable could not be read
#
# Performance Tuning
# ------------------
# parallelism: null                # Scan threads (null or 0 = auto)
# scan_timeout_secs: null          # Abort a live scan after N seconds
#
# Web UI
# ------
# bind: "127.0.0.1"                # Bind IP
# port: 8080                       # HTTP port
#
# Logging
# -------
# log_level: "warn"                # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
