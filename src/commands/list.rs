//! List command implementation.
//!
//! Prints every process in the table.

use proctor::{Inspector, Process};

use crate::cli::OutputFormat;
use crate::commands::open_inspector;
use crate::config::Config;
use crate::output::render_processes;

/// Lists all processes.
pub fn command_list(config: &Config, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut inspector = open_inspector(config);
    let processes = inspector.get_processes()?;

    let all: Vec<&Process> = processes.values().collect();
    println!("{}", render_processes(&all, format)?);
    Ok(())
}
