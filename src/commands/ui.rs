//! UI command implementation.
//!
//! Serves the web UI until SIGINT or SIGTERM.

use anyhow::Context;
use axum::{routing::get, Router};
use proctor::Inspector;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use crate::commands::open_inspector;
use crate::config::{Config, DEFAULT_BIND_ADDR, DEFAULT_PORT};
use crate::handlers::{index_handler, process_handler, refresh_handler, tree_handler};
use crate::startup_checks;
use crate::state::{AppState, SharedState};

/// Builds the router with all UI routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/process/{pid}", get(process_handler))
        .route("/tree/{pid}", get(tree_handler))
        .route("/refresh", get(refresh_handler))
        .with_state(state)
}

/// Resolves the listen address (CLI > config > defaults).
pub fn listen_addr(bind: Option<IpAddr>, port: Option<u16>, config: &Config) -> anyhow::Result<SocketAddr> {
    let ip = match bind {
        Some(ip) => ip,
        None => config
            .bind
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .with_context(|| format!("invalid bind address {:?}", config.bind))?,
    };
    let port = port.or(config.port).unwrap_or(DEFAULT_PORT);
    Ok(SocketAddr::new(ip, port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Serves the web UI.
pub async fn command_ui(
    bind: Option<IpAddr>,
    port: Option<u16>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = listen_addr(bind, port, config)?;
    let inspector = open_inspector(config);

    if let Err(e) = startup_checks::validate_requirements(&inspector.config().procfs_path) {
        warn!("❌ Startup validation failed: {}", e);
        warn!("   The UI will start but some processes may be incomplete!");
    }

    let state: SharedState = Arc::new(AppState::new(inspector));

    // Populate the table before the first request
    info!("Performing initial process load");
    match state
        .with_inspector(|inspector| inspector.get_processes().map(|p| p.len()))
        .await
    {
        Ok(count) => info!("Initial process load completed with {} processes", count),
        Err(e) => error!("Initial process load failed: {}", e),
    }

    let app = build_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("proctor UI listening on http://{}", addr);
    println!("✅ Serving on http://{}", addr);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, exiting...");
        }
    }

    info!("proctor UI stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr_precedence() {
        let config = Config {
            bind: Some("0.0.0.0".into()),
            port: Some(9000),
            ..Config::default()
        };

        let addr = listen_addr(None, None, &config).expect("valid address");
        assert_eq!(addr, "0.0.0.0:9000".parse::<SocketAddr>().expect("addr"));

        let addr = listen_addr(Some("127.0.0.1".parse().expect("ip")), Some(7000), &config)
            .expect("valid address");
        assert_eq!(addr, "127.0.0.1:7000".parse::<SocketAddr>().expect("addr"));

        let empty = Config {
            bind: None,
            port: None,
            ..Config::default()
        };
        let addr = listen_addr(None, None, &empty).expect("valid address");
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_listen_addr_rejects_bad_bind() {
        let config = Config {
            bind: Some("localhost:80".into()),
            ..Config::default()
        };
        assert!(listen_addr(None, None, &config).is_err());
    }
}
