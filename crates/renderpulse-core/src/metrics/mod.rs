//! Metric instruments and the registry that owns them.
//!
//! Series storage follows the same scheme throughout: a `DashMap` keyed by
//! label-value vectors (in declared label order), with atomic cells as
//! values. Series are created lazily on first observation and never removed.

pub mod instruments;
pub mod registry;

pub use instruments::{Counter, Gauge, Histogram, DEFAULT_LATENCY_BUCKETS};
pub use registry::{MetricDescriptor, MetricKind, Registry};
