//! Service-level instrument set.
//!
//! One registry for the process, registered in full at startup; series are
//! created lazily as label combinations are first observed.

use renderpulse_core::{Counter, Gauge, Histogram, Registry, Result, DEFAULT_LATENCY_BUCKETS};

pub struct ServiceMetrics {
    registry: Registry,
    /// `http_requests_total{method, endpoint, status}`
    pub http_requests: Counter,
    /// `http_request_duration_seconds{method, endpoint}`
    pub http_request_duration: Histogram,
    /// In-flight request count.
    pub active_connections: Gauge,
    /// `render_jobs_total{status}`
    pub render_jobs: Counter,
    service_uptime: Gauge,
}

impl ServiceMetrics {
    /// Register the full instrument set. A duplicate name is fatal.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let http_requests = registry.register_counter(
            "http_requests_total",
            "Total HTTP requests",
            &["method", "endpoint", "status"],
        )?;
        let http_request_duration = registry.register_histogram(
            "http_request_duration_seconds",
            "HTTP request duration",
            &["method", "endpoint"],
            &DEFAULT_LATENCY_BUCKETS,
        )?;
        let active_connections =
            registry.register_gauge("active_connections", "Number of active connections")?;
        let render_jobs = registry.register_counter(
            "render_jobs_total",
            "Total render jobs processed",
            &["status"],
        )?;
        let service_uptime =
            registry.register_gauge("service_uptime_seconds", "Service uptime in seconds")?;

        Ok(Self {
            registry,
            http_requests,
            http_request_duration,
            active_connections,
            render_jobs,
            service_uptime,
        })
    }

    /// Refresh the uptime gauge, then serialize the registry, so scraped
    /// uptime is current at scrape time rather than at last request time.
    pub fn render(&self, uptime_seconds: f64) -> String {
        self.service_uptime.set(uptime_seconds);
        self.registry.render()
    }

    /// Refresh the uptime gauge without rendering (request-exit path).
    pub fn refresh_uptime(&self, uptime_seconds: f64) {
        self.service_uptime.set(uptime_seconds);
    }
}
