//! Tree command implementation.
//!
//! Prints the ancestry of a process from the process itself up to the root.

use proctor::{resolve_ancestry, Inspector};

use crate::cli::OutputFormat;
use crate::commands::open_inspector;
use crate::config::Config;
use crate::output::render_relation;

/// Shows the ancestry chain of `pid`.
pub fn command_tree(
    pid: u32,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut inspector = open_inspector(config);
    let processes = inspector.get_processes()?;

    let relation = resolve_ancestry(processes, pid)?.into_relation();
    print!("{}", render_relation(&relation, format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
