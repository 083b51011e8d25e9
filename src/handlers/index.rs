//! Process list endpoint handler.
//!
//! This module provides the `/` endpoint handler that lists every process
//! in the store along with the time the table was scanned.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use proctor::{Inspector, Process};
use tracing::{debug, instrument};

use crate::handlers::html::{escape, html_footer, html_header};
use crate::state::{SharedState, StateError};

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn index_handler(State(state): State<SharedState>) -> Result<impl IntoResponse, StateError> {
    debug!("Processing / request");

    let (mut processes, loaded_at) = state
        .with_inspector(|inspector| {
            let processes: Vec<Process> = inspector.get_processes()?.values().cloned().collect();
            Ok((processes, inspector.last_load_time()))
        })
        .await?;
    processes.sort_by_key(|p| p.id);

    let last_refreshed = loaded_at
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "never".to_string());

    let uptime_secs = state.start_time.elapsed().as_secs();
    let uptime_str = format!(
        "{}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    let mut rows = String::new();
    for p in &processes {
        rows.push_str(&format!(
            "<tr><td><a href=\"/process/{id}\">{id}</a></td><td>{name}</td><td>{path}</td><td><code>{sha}</code></td><td><a href=\"/tree/{id}\">tree</a></td></tr>\n",
            id = p.id,
            name = escape(&p.command_name),
            path = escape(&p.command_path.display()),
            sha = escape(&p.binary_sha.to_string()),
        ));
    }

    let html = format!(
        r#"{header}<h1>Processes</h1>
<div class="metric"><span class="metric-label">Last Refreshed:</span> <span class="metric-value">{last_refreshed}</span></div>
<div class="metric"><span class="metric-label">Processes:</span> <span class="metric-value">{count}</span></div>
<div class="metric"><span class="metric-label">Uptime:</span> <span class="metric-value">{uptime}</span></div>
<table>
<tr><th>PID</th><th>Name</th><th>Location</th><th>SHA256</th><th>Ancestry</th></tr>
{rows}</table>
{footer}"#,
        header = html_header("Processes"),
        last_refreshed = last_refreshed,
        count = processes.len(),
        uptime = uptime_str,
        rows = rows,
        footer = html_footer()
    );

    Ok(Html(html))
}
