//! Rendering of processes for the terminal.
//!
//! Tables are plain padded text; JSON goes through serde_json.

use proctor::{Process, ProcessRelation};

use crate::cli::OutputFormat;

/// Longest command name shown before truncation in tables.
const NAME_WIDTH: usize = 24;

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Renders processes sorted by pid in the requested format.
pub fn render_processes(
    processes: &[&Process],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let mut sorted: Vec<&Process> = processes.to_vec();
    sorted.sort_by_key(|p| p.id);

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&sorted),
        OutputFormat::Table => Ok(process_table(&sorted)),
    }
}

/// Renders one process with all details.
pub fn render_process(process: &Process, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(process),
        OutputFormat::Table => Ok(process_details(process)),
    }
}

/// Renders an ancestry relation, child first.
pub fn render_relation(
    relation: &ProcessRelation,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(relation),
        OutputFormat::Table => Ok(relation_tree(relation)),
    }
}

fn process_table(processes: &[&Process]) -> String {
    let mut out = format!(
        "{:<8} {:<width$} {:<64} {}\n",
        "PID",
        "NAME",
        "SHA256",
        "LOCATION",
        width = NAME_WIDTH
    );
    for p in processes {
        out.push_str(&format!(
            "{:<8} {:<width$} {:<64} {}\n",
            p.id,
            truncate(&p.command_name, NAME_WIDTH),
            p.binary_sha,
            p.command_path.display(),
            width = NAME_WIDTH
        ));
    }
    out.push_str(&format!("\n{} processes\n", processes.len()));
    out
}

fn process_details(p: &Process) -> String {
    let rows: Vec<(&str, String)> = vec![
        ("PID", p.id.to_string()),
        ("Parent PID", p.parent_process.to_string()),
        ("Name", p.command_name.clone()),
        ("Location", p.command_path.display()),
        ("Arguments", p.flags_and_args()),
        ("SHA256", p.binary_sha.to_string()),
        ("Kernel task", p.is_kernel_task.to_string()),
        ("Inspectable", p.has_permission.to_string()),
        (
            "State",
            format!("{} ({})", p.stat.state, p.stat.state_description()),
        ),
        ("Threads", p.stat.thread_count.to_string()),
        ("CPU time", format!("{:.2}s", p.stat.cpu_time_seconds())),
        ("Virtual memory", format!("{} bytes", p.stat.virtual_mem_size)),
    ];

    rows.iter()
        .map(|(k, v)| format!("{:<16} {}\n", format!("{}:", k), v))
        .collect()
}

fn relation_tree(relation: &ProcessRelation) -> String {
    let mut out = String::new();
    let mut depth: usize = 0;
    let mut current = Some(relation);
    while let Some(r) = current {
        let marker = if depth == 0 { "" } else { "└─ " };
        out.push_str(&format!(
            "{}{}{} [{}] {}\n",
            "   ".repeat(depth.saturating_sub(1)),
            marker,
            r.process.id,
            r.process.command_name,
            r.process.binary_sha
        ));
        depth += 1;
        current = r.parent.as_deref();
    }
    out
}
