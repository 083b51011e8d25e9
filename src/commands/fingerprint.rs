//! Fingerprint command implementation.

use proctor::{fingerprint_process, Inspector};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::open_inspector;
use crate::config::Config;

/// Prints the lineage fingerprint of `pid`.
pub fn command_fingerprint(
    pid: u32,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut inspector = open_inspector(config);
    let processes = inspector.get_processes()?;

    let fp = fingerprint_process(processes, pid)?;
    match format {
        OutputFormat::Table => println!("{}", fp),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "pid": pid, "fingerprint": fp }))?
        ),
    }
    Ok(())
}
