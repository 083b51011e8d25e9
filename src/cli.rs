//! CLI arguments and subcommands for proctor.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for process listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "proctor",
    about = "Inspect Linux processes, their binaries and their ancestry",
    long_about = "Inspect Linux processes, their binaries and their ancestry.\n\n\
                  Reads process details from procfs, hashes each executable with SHA-256 and \
                  caches the result on disk so repeated queries are fast. Resolves parent chains \
                  and computes lineage fingerprints.",
    version,
    propagate_version = true
)]
pub struct Args {
    /// Subcommand to run (default: list)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (default: warn)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml", global = true)]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long, global = true)]
    pub check_config: bool,

    /// Root of the process filesystem
    #[arg(long, global = true)]
    pub procfs: Option<PathBuf>,

    /// Directory holding the process snapshot
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Never read or write the process snapshot
    #[arg(long, global = true)]
    pub ignore_cache: bool,

    /// Include kernel tasks
    #[arg(long, global = true)]
    pub include_kernel: bool,

    /// Include processes that could not be fully inspected
    #[arg(long, global = true)]
    pub include_permission_issues: bool,

    /// Delete the process snapshot before running the command
    #[arg(long, global = true)]
    pub reset_cache: bool,

    /// Parallel scan threads (0 = auto)
    #[arg(long, global = true)]
    pub parallelism: Option<usize>,

    /// Abort a live scan after N seconds
    #[arg(long, global = true)]
    pub scan_timeout_secs: Option<u64>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,
}

/// Process selection for `get`
#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct ProcessSelector {
    /// Process ID
    #[arg(long)]
    pub id: Option<u32>,

    /// Command name; every process with this name is returned
    #[arg(long)]
    pub name: Option<String>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all processes
    #[command(alias = "ls")]
    List,

    /// Show one process by id, or every process with a name
    Get {
        #[command(flatten)]
        selector: ProcessSelector,
    },

    /// Show the ancestry of a process up to the root
    Tree {
        /// Process ID
        pid: u32,
    },

    /// Compute the lineage fingerprint of a process
    #[command(alias = "fp")]
    Fingerprint {
        /// Process ID
        pid: u32,
    },

    /// Rescan all processes and rewrite the snapshot
    Refresh,

    /// Delete the process snapshot
    ClearCache,

    /// Check procfs access, privileges and snapshot location
    Check,

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'f', long = "file")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Serve a small web UI
    Ui {
        /// Bind to specific interface/IP
        #[arg(long)]
        bind: Option<IpAddr>,

        /// HTTP listen port
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
}
