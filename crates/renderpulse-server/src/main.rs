//! RenderPulse server binary.
//!
//! Boot order: tracing, config, state, heartbeat task, HTTP listener.
//! Config comes from an optional path argument, falling back to
//! `renderpulse.yaml` in the working directory, then to built-in defaults.

use std::path::Path;

use tracing_subscriber::{fmt, EnvFilter};

use renderpulse_server::{app_state::AppState, config, heartbeat, router};

const DEFAULT_CONFIG_PATH: &str = "renderpulse.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(&path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            config::load_from_file(DEFAULT_CONFIG_PATH)
        }
        None => Ok(config::ServiceConfig::default()),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            std::process::exit(1);
        }
    };

    let listen = match cfg.server.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid listen address");
            std::process::exit(1);
        }
    };

    let state = match AppState::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "state init failed");
            std::process::exit(1);
        }
    };

    if state.cfg().heartbeat.enabled {
        tokio::spawn(heartbeat::run(state.cfg().heartbeat.clone()));
    }

    let app = router::build_router(state);

    tracing::info!(%listen, "renderpulse-server starting");
    tracing::info!("scrape endpoint at /metrics; demo endpoints: /, /simulate-load, /simulate-render, /generate-traffic");
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, %listen, "failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
