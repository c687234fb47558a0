//! Demonstration endpoints exercising the instrumentation.
//!
//! No metrics logic lives here beyond one business counter; each handler is
//! just a caller behind the interceptor.

use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use crate::app_state::AppState;

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "RenderPulse metrics service",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
    }))
}

/// Simulated processing load: a fixed non-blocking delay.
pub async fn simulate_load() -> Json<Value> {
    sleep(Duration::from_millis(100)).await;

    Json(json!({
        "message": "Load simulated",
        "processing_time": "0.1s",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Simulated render job: jittered duration, 90% success rate.
pub async fn simulate_render(State(state): State<AppState>) -> Json<Value> {
    // ThreadRng is not Send; sample before suspending.
    let (secs, succeeded) = {
        let mut rng = rand::thread_rng();
        (rng.gen_range(0.5..2.0), rng.gen_bool(0.9))
    };
    sleep(Duration::from_secs_f64(secs)).await;

    let status = if succeeded { "success" } else { "failed" };
    if let Err(e) = state.metrics().render_jobs.inc(&[("status", status)]) {
        tracing::warn!(error = %e, "render job counter update failed");
    }

    Json(json!({
        "message": format!("Render job {status}"),
        "processing_time": format!("{secs:.2}s"),
        "status": status,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Drive a short burst of simulated internal calls so a scrape has fresh
/// request data to show.
pub async fn generate_traffic() -> Json<Value> {
    const TARGETS: [&str; 3] = ["health", "status", "simulate-load"];

    let n = rand::thread_rng().gen_range(5..=10);
    let mut details = Vec::with_capacity(n);
    for _ in 0..n {
        let endpoint = TARGETS[rand::thread_rng().gen_range(0..TARGETS.len())];
        let start = Instant::now();
        if endpoint == "simulate-load" {
            sleep(Duration::from_millis(100)).await;
        }
        details.push(json!({
            "endpoint": endpoint,
            "duration": format!("{:.3}s", start.elapsed().as_secs_f64()),
        }));
        sleep(Duration::from_millis(50)).await;
    }

    Json(json!({
        "message": "Traffic generated",
        "requests_made": details.len(),
        "details": details,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
