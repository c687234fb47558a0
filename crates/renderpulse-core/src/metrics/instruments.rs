//! Counter / histogram / gauge accumulators.
//!
//! All mutation goes through atomic operations; `f64` cells are stored as
//! bit patterns in an `AtomicU64` and updated with a compare-exchange loop,
//! so concurrent increments never lose updates. Handles are cheap clones
//! sharing the series storage owned by the registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{PulseError, Result};
use crate::metrics::registry::MetricDescriptor;

/// Default request-latency bucket upper bounds, in seconds.
pub const DEFAULT_LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// `f64` cell with atomic load/store/add semantics.
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub(crate) fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn add(&self, delta: f64) {
        let mut cur = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + delta).to_bits();
            match self
                .0
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(seen) => cur = seen,
            }
        }
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

pub(crate) struct CounterCore {
    pub(crate) desc: MetricDescriptor,
    pub(crate) series: DashMap<Vec<String>, AtomicF64>,
}

/// Monotonically non-decreasing accumulator with label dimensions.
#[derive(Clone)]
pub struct Counter {
    pub(crate) core: Arc<CounterCore>,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1.0)
    }

    /// Increment by an arbitrary non-negative amount.
    pub fn add(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        if !v.is_finite() || v < 0.0 {
            return Err(PulseError::InvalidValue(format!(
                "counter {}: increment must be finite and >= 0, got {v}",
                self.core.desc.name
            )));
        }
        let key = self.core.desc.series_key(labels)?;
        self.core.series.entry(key).or_default().add(v);
        Ok(())
    }

    /// Current value for a label set (0 if the series was never written).
    pub fn get(&self, labels: &[(&str, &str)]) -> Result<f64> {
        let key = self.core.desc.series_key(labels)?;
        Ok(self
            .core
            .series
            .get(&key)
            .map(|c| c.value().get())
            .unwrap_or(0.0))
    }
}

pub(crate) struct HistogramSeries {
    pub(crate) count: AtomicU64,
    pub(crate) sum: AtomicF64,
    pub(crate) buckets: Box<[AtomicU64]>,
}

impl HistogramSeries {
    fn new(n_buckets: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
            buckets: (0..n_buckets).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

pub(crate) struct HistogramCore {
    pub(crate) desc: MetricDescriptor,
    pub(crate) bounds: Vec<f64>,
    pub(crate) series: DashMap<Vec<String>, HistogramSeries>,
}

/// Accumulator bucketing observations into cumulative ranges plus sum/count.
#[derive(Clone)]
pub struct Histogram {
    pub(crate) core: Arc<HistogramCore>,
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("name", &self.core.desc.name)
            .finish()
    }
}

impl Histogram {
    /// Record one observation: every bucket with bound >= `v`, the total
    /// count, and the sum.
    pub fn observe(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        if !v.is_finite() || v < 0.0 {
            return Err(PulseError::InvalidValue(format!(
                "histogram {}: observation must be finite and >= 0, got {v}",
                self.core.desc.name
            )));
        }
        let key = self.core.desc.series_key(labels)?;
        let series = self
            .core
            .series
            .entry(key)
            .or_insert_with(|| HistogramSeries::new(self.core.bounds.len()));

        // Update order matters for lock-free renders: count first, then the
        // buckets from the widest bound down. Paired with the renderer's
        // narrowest-first read, no interleaving shows an inner bucket ahead
        // of a wider one or of the +Inf total.
        series.count.fetch_add(1, Ordering::Relaxed);
        series.sum.add(v);
        for (i, &bound) in self.core.bounds.iter().enumerate().rev() {
            if v > bound {
                break;
            }
            series.buckets[i].fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

pub(crate) struct GaugeCore {
    pub(crate) desc: MetricDescriptor,
    pub(crate) value: AtomicF64,
}

/// Point-in-time scalar that can move up or down. Unlabeled.
#[derive(Clone)]
pub struct Gauge {
    pub(crate) core: Arc<GaugeCore>,
}

impl std::fmt::Debug for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gauge")
            .field("name", &self.core.desc.name)
            .finish()
    }
}

impl Gauge {
    /// Overwrite the current value.
    pub fn set(&self, v: f64) {
        self.core.value.set(v);
    }

    /// Adjust upward relative to the current value.
    pub fn inc(&self, delta: f64) {
        self.core.value.add(delta);
    }

    /// Adjust downward relative to the current value.
    pub fn dec(&self, delta: f64) {
        self.core.value.add(-delta);
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.core.value.get()
    }
}
