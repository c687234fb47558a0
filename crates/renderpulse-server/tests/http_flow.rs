//! End-to-end router tests: interception, scrape output, operational
//! endpoints, and in-flight gauge lifecycle.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use renderpulse_server::app_state::AppState;
use renderpulse_server::config::ServiceConfig;
use renderpulse_server::obs::interceptor::track_requests;
use renderpulse_server::router::build_router;
use tokio::time::{sleep, Duration};
use tower::ServiceExt;

fn test_state() -> AppState {
    AppState::new(ServiceConfig::default()).unwrap()
}

async fn send(app: &Router, method: &str, path: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Value of the first exposition line starting with `prefix`.
fn line_value(exposition: &str, prefix: &str) -> f64 {
    let line = exposition
        .lines()
        .find(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix:?}"));
    line.rsplit(' ').next().unwrap().parse().unwrap()
}

#[tokio::test]
async fn scrape_before_traffic_exposes_no_request_series() {
    let app = build_router(test_state());

    let (status, body) = send(&app, "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE http_requests_total counter"));
    assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
    assert!(!body.lines().any(|l| l.starts_with("http_requests_total{")));
    assert!(body.contains("\nactive_connections 0\n"));
}

#[tokio::test]
async fn scrape_content_type_identifies_exposition_format() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn single_tracked_request_recorded_exactly_once() {
    let app = build_router(test_state());

    let (status, _) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/metrics").await;
    let series: Vec<&str> = body
        .lines()
        .filter(|l| l.starts_with("http_requests_total{"))
        .collect();
    assert_eq!(series.len(), 1);
    assert_eq!(
        series[0],
        "http_requests_total{method=\"GET\",endpoint=\"/health\",status=\"200\"} 1"
    );

    let count = line_value(
        &body,
        "http_request_duration_seconds_count{method=\"GET\",endpoint=\"/health\"}",
    );
    let sum = line_value(
        &body,
        "http_request_duration_seconds_sum{method=\"GET\",endpoint=\"/health\"}",
    );
    assert_eq!(count, 1.0);
    assert!(sum > 0.0);
}

#[tokio::test]
async fn scrape_never_includes_itself_only_earlier_scrapes() {
    let app = build_router(test_state());

    let (_, first) = send(&app, "GET", "/metrics").await;
    assert!(!first.lines().any(|l| l.starts_with("http_requests_total{")));

    let (_, second) = send(&app, "GET", "/metrics").await;
    assert_eq!(
        line_value(
            &second,
            "http_requests_total{method=\"GET\",endpoint=\"/metrics\",status=\"200\"}"
        ),
        1.0
    );
}

#[tokio::test]
async fn uptime_non_decreasing_between_scrapes() {
    let app = build_router(test_state());

    let (_, first) = send(&app, "GET", "/metrics").await;
    let (_, second) = send(&app, "GET", "/metrics").await;
    let u1 = line_value(&first, "service_uptime_seconds");
    let u2 = line_value(&second, "service_uptime_seconds");
    assert!(u2 >= u1);
}

#[tokio::test(flavor = "multi_thread")]
async fn ten_concurrent_render_jobs_all_counted() {
    let app = build_router(test_state());

    let mut handles = Vec::new();
    for _ in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let response = app
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/simulate-render")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let (_, body) = send(&app, "GET", "/metrics").await;
    let total: f64 = body
        .lines()
        .filter(|l| l.starts_with("render_jobs_total{"))
        .map(|l| l.rsplit(' ').next().unwrap().parse::<f64>().unwrap())
        .sum();
    assert_eq!(total, 10.0);
}

#[tokio::test]
async fn inflight_gauge_returns_to_zero_after_completion() {
    let state = test_state();
    let app = build_router(state.clone());

    for _ in 0..3 {
        send(&app, "GET", "/health").await;
    }
    assert_eq!(state.metrics().active_connections.value(), 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn inflight_gauge_released_on_cancellation() {
    let state = test_state();
    let app = Router::new()
        .route("/slow", get(|| async { sleep(Duration::from_secs(30)).await }))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .with_state(());

    let handle = tokio::spawn(
        app.oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap()),
    );
    sleep(Duration::from_millis(100)).await;
    assert_eq!(state.metrics().active_connections.value(), 1.0);

    // Abort mid-flight; the guard must still release the gauge.
    handle.abort();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(state.metrics().active_connections.value(), 0.0);
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = build_router(test_state());

    let (status, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "healthy");
    assert!(v["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn status_reports_series_count() {
    let app = build_router(test_state());

    send(&app, "GET", "/health").await;
    let (status, body) = send(&app, "GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "running");
    assert_eq!(v["metrics_endpoint"], "/metrics");
    // At least: the /health request series, its histogram lines, and the
    // two gauges.
    assert!(v["metric_series_count"].as_u64().unwrap() >= 4);
}

#[tokio::test]
async fn demo_endpoints_respond() {
    let app = build_router(test_state());

    let (status, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("RenderPulse"));

    let (status, body) = send(&app, "POST", "/simulate-load").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["processing_time"], "0.1s");

    let (status, body) = send(&app, "GET", "/generate-traffic").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    let made = v["requests_made"].as_u64().unwrap();
    assert!((5..=10).contains(&made));
    assert_eq!(v["details"].as_array().unwrap().len() as u64, made);
}
