//! RenderPulse core: metric registry, instruments, and the exposition renderer.
//!
//! This crate owns the in-process telemetry state shared by the server: typed,
//! label-dimensioned accumulators (counter / histogram / gauge) behind a
//! registry that serializes them into the Prometheus text format. It
//! intentionally carries no transport or runtime dependencies so it can be
//! reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `PulseError`/`Result` so production
//! processes do not crash on bad instrument input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{PulseError, Result};
pub use metrics::{
    Counter, Gauge, Histogram, MetricDescriptor, MetricKind, Registry, DEFAULT_LATENCY_BUCKETS,
};
