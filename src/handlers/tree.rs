//! Ancestry endpoint handler.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
};
use proctor::{fingerprint, resolve_ancestry, Inspector, Process};
use tracing::{debug, instrument};

use crate::handlers::html::{escape, html_footer, html_header};
use crate::state::{SharedState, StateError};

/// Handler for the `/tree/{pid}` endpoint.
#[instrument(skip(state))]
pub async fn tree_handler(
    State(state): State<SharedState>,
    Path(pid): Path<u32>,
) -> Result<impl IntoResponse, StateError> {
    debug!("Processing /tree/{} request", pid);

    let (chain, fp): (Vec<Process>, Result<String, String>) = state
        .with_inspector(move |inspector| {
            let chain = resolve_ancestry(inspector.get_processes()?, pid)?;
            let fp = fingerprint(&chain).map_err(|e| e.to_string());
            Ok((chain.processes().to_vec(), fp))
        })
        .await?;

    let mut rows = String::new();
    for (depth, p) in chain.iter().enumerate() {
        rows.push_str(&format!(
            "<tr><td>{depth}</td><td><a href=\"/process/{id}\">{id}</a></td><td>{name}</td><td>{path}</td><td><code>{sha}</code></td></tr>\n",
            depth = depth,
            id = p.id,
            name = escape(&p.command_name),
            path = escape(&p.command_path.display()),
            sha = escape(&p.binary_sha.to_string()),
        ));
    }

    let fingerprint_html = match fp {
        Ok(fp) => format!("<code>{}</code>", fp),
        Err(e) => format!("<span class=\"status-error\">{}</span>", escape(&e)),
    };

    let html = format!(
        r#"{header}<h1>Ancestry of {pid}</h1>
<div class="metric"><span class="metric-label">Fingerprint:</span> {fingerprint}</div>
<table>
<tr><th>Depth</th><th>PID</th><th>Name</th><th>Location</th><th>SHA256</th></tr>
{rows}</table>
{footer}"#,
        header = html_header(&format!("Ancestry of {}", pid)),
        pid = pid,
        fingerprint = fingerprint_html,
        rows = rows,
        footer = html_footer()
    );

    Ok(Html(html))
}
