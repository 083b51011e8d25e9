//! Get command implementation.
//!
//! Looks up a single process by id, or every process sharing a name.

use proctor::{find_processes_by_name, InspectError, Inspector};

use crate::cli::{OutputFormat, ProcessSelector};
use crate::commands::open_inspector;
use crate::config::Config;
use crate::output::{render_process, render_processes};

/// Shows the selected process(es).
pub fn command_get(
    selector: &ProcessSelector,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut inspector = open_inspector(config);
    let processes = inspector.get_processes()?;

    if let Some(pid) = selector.id {
        let process = processes
            .get(&pid)
            .ok_or(InspectError::ProcessNotFound { pid })?;
        println!("{}", render_process(process, format)?);
        return Ok(());
    }

    if let Some(name) = selector.name.as_deref() {
        let found = find_processes_by_name(processes, name);
        if found.is_empty() {
            return Err(InspectError::ProcessNameNotFound {
                name: name.to_string(),
            }
            .into());
        }
        match found.as_slice() {
            [only] => println!("{}", render_process(only, format)?),
            many => println!("{}", render_processes(many, format)?),
        }
        return Ok(());
    }

    Err("either --id or --name is required".into())
}
