//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness + uptime
//! - `/status`  : running-state summary, including exposed series count
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::app_state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
    }))
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let exposition = state.metrics().render(state.uptime_seconds());
    let series_count = exposition
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .count();

    Json(json!({
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "metrics_endpoint": "/metrics",
        "metric_series_count": series_count,
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render(state.uptime_seconds());

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
        .into_response()
}
