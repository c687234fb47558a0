//! Request interception: per-request measurements around the handler.
//!
//! Applied as a middleware layer over every route. Entry increments the
//! in-flight gauge; exit records duration and outcome labels. The gauge
//! decrement is tied to request scope through an RAII guard, so it runs on
//! normal completion, handler failure, and caller cancellation alike.

use std::time::Instant;

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use renderpulse_core::Gauge;

use crate::app_state::AppState;

struct InflightGuard {
    gauge: Gauge,
}

impl InflightGuard {
    fn enter(gauge: Gauge) -> Self {
        gauge.inc(1.0);
        Self { gauge }
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.gauge.dec(1.0);
    }
}

/// Measure one request/response pair and update the instruments.
///
/// The `endpoint` label is the raw request path. Instrumentation failures
/// are logged and never touch the response itself.
pub async fn track_requests(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let _inflight = InflightGuard::enter(app.metrics().active_connections.clone());

    let response = next.run(req).await;

    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    let m = app.metrics();
    if let Err(e) = m.http_requests.inc(&[
        ("method", &method),
        ("endpoint", &path),
        ("status", &status),
    ]) {
        tracing::warn!(error = %e, %method, %path, "request counter update failed");
    }
    if let Err(e) =
        m.http_request_duration
            .observe(&[("method", &method), ("endpoint", &path)], elapsed)
    {
        tracing::warn!(error = %e, %method, %path, "request duration update failed");
    }
    m.refresh_uptime(app.uptime_seconds());

    tracing::debug!(%method, %path, %status, elapsed_secs = elapsed, "request recorded");
    response
}
