//! Shared application state.
//!
//! Owns the config, the metric instruments, and the process start instant.
//! Startup errors are explicit (Result instead of panic).

use std::sync::Arc;
use std::time::Instant;

use renderpulse_core::Result;

use crate::config::ServiceConfig;
use crate::obs::metrics::ServiceMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    metrics: ServiceMetrics,
    /// Set once at construction; read (never mutated) by uptime calculation.
    started_at: Instant,
}

impl AppState {
    /// Build application state. A metric registration failure here is a
    /// wiring bug and aborts initialization.
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let metrics = ServiceMetrics::new()?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics,
                started_at: Instant::now(),
            }),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.inner.metrics
    }

    /// Seconds since this service instance was constructed.
    pub fn uptime_seconds(&self) -> f64 {
        self.inner.started_at.elapsed().as_secs_f64()
    }
}
