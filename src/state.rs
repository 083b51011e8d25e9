//! Application state management for the web UI.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use proctor::{InspectError, LinuxInspector};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    /// Process store. Core calls are blocking and run under this lock, so a
    /// refresh and a read never interleave.
    pub inspector: Arc<Mutex<LinuxInspector>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(inspector: LinuxInspector) -> Self {
        Self {
            inspector: Arc::new(Mutex::new(inspector)),
            start_time: Instant::now(),
        }
    }

    /// Runs `f` against the store on the blocking thread pool.
    pub async fn with_inspector<T, F>(&self, f: F) -> Result<T, StateError>
    where
        F: FnOnce(&mut LinuxInspector) -> proctor::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inspector = Arc::clone(&self.inspector);
        tokio::task::spawn_blocking(move || {
            let mut guard = inspector.lock().map_err(|_| StateError::Poisoned)?;
            f(&mut guard).map_err(StateError::Inspect)
        })
        .await
        .map_err(|e| StateError::Task(e.to_string()))?
    }
}

/// Failure of a store call made on behalf of a request.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error("process store lock poisoned by an earlier failure")]
    Poisoned,

    #[error("background task failed: {0}")]
    Task(String),
}

impl StateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StateError::Inspect(e) if e.is_not_found())
    }
}
