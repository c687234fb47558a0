//! Axum router wiring.
//!
//! Every route passes through the metrics interceptor, `/metrics` included;
//! a scrape records its own request only after its body is rendered, so a
//! scrape never shows itself, only earlier ones.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, obs, ops, services::demo};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(demo::root))
        .route("/health", get(ops::health))
        .route("/status", get(ops::status))
        .route("/metrics", get(ops::metrics))
        .route("/simulate-load", post(demo::simulate_load))
        .route("/simulate-render", post(demo::simulate_render))
        .route("/generate-traffic", get(demo::generate_traffic))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::interceptor::track_requests,
        ))
        .with_state(state)
}
