//! Refresh endpoint handler.
//!
//! Deletes the snapshot, rescans procfs and sends the browser back to the
//! process list.

use axum::{extract::State, response::Redirect};
use proctor::Inspector;
use tracing::{info, instrument};

use crate::state::{SharedState, StateError};

/// Handler for the `/refresh` endpoint.
#[instrument(skip(state))]
pub async fn refresh_handler(State(state): State<SharedState>) -> Result<Redirect, StateError> {
    info!("Refreshing process table");

    state
        .with_inspector(|inspector| {
            inspector.clear_process_cache()?;
            inspector.load_processes()
        })
        .await?;

    Ok(Redirect::to("/"))
}
