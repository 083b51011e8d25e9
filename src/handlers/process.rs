//! Process details endpoint handler.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
};
use proctor::{InspectError, Inspector};
use tracing::{debug, instrument};

use crate::handlers::html::{escape, html_footer, html_header};
use crate::state::{SharedState, StateError};

/// Handler for the `/process/{pid}` endpoint.
#[instrument(skip(state))]
pub async fn process_handler(
    State(state): State<SharedState>,
    Path(pid): Path<u32>,
) -> Result<impl IntoResponse, StateError> {
    debug!("Processing /process/{} request", pid);

    let p = state
        .with_inspector(move |inspector| {
            inspector
                .get_processes()?
                .get(&pid)
                .cloned()
                .ok_or(InspectError::ProcessNotFound { pid })
        })
        .await?;

    let rows = [
        ("PID", p.id.to_string()),
        ("Parent PID", p.parent_process.to_string()),
        ("Name", p.command_name.clone()),
        ("Location", p.command_path.display()),
        ("Arguments", p.flags_and_args()),
        ("SHA256", p.binary_sha.to_string()),
        ("Kernel task", p.is_kernel_task.to_string()),
        ("Inspectable", p.has_permission.to_string()),
        ("State", format!("{} ({})", p.stat.state, p.stat.state_description())),
        ("Session", p.stat.session_id.to_string()),
        ("Threads", p.stat.thread_count.to_string()),
        ("Priority / nice", format!("{} / {}", p.stat.priority, p.stat.nice)),
        ("CPU time", format!("{:.2}s", p.stat.cpu_time_seconds())),
        ("Virtual memory", format!("{} bytes", p.stat.virtual_mem_size)),
        ("Resident pages", p.stat.resident_set_size.to_string()),
        ("Start time (ticks)", p.stat.start_time.to_string()),
    ];

    let table: String = rows
        .iter()
        .map(|(k, v)| format!("<tr><th>{}</th><td><code>{}</code></td></tr>\n", k, escape(v)))
        .collect();

    let parent_link = if p.parent_process != 0 {
        format!(
            "<p><a href=\"/process/{0}\">Parent process {0}</a></p>",
            p.parent_process
        )
    } else {
        String::new()
    };

    let html = format!(
        r#"{header}<h1>Process {id}: {name}</h1>
<p><a href="/tree/{id}">Show ancestry</a></p>
{parent_link}
<table>
{table}</table>
{footer}"#,
        header = html_header(&format!("Process {}", p.id)),
        id = p.id,
        name = escape(&p.command_name),
        parent_link = parent_link,
        table = table,
        footer = html_footer()
    );

    Ok(Html(html))
}
