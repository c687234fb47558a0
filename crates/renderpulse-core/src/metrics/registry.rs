//! Metric registry and the Prometheus text exposition renderer.
//!
//! The set of registered metrics is fixed at process start; series values
//! mutate continuously afterwards. Rendering is a pure read: metrics emit in
//! registration order and series within a metric in sorted label order, so
//! unchanged state renders byte-identically across scrapes.

use std::fmt::Write;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::error::{PulseError, Result};
use crate::metrics::instruments::{
    AtomicF64, Counter, CounterCore, Gauge, GaugeCore, Histogram, HistogramCore,
};

/// Instrument kind, as spelled in `# TYPE` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Immutable identity of one registered metric.
#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    /// Declared label schema; every series of the metric carries exactly
    /// these label names.
    pub label_names: Vec<String>,
}

impl MetricDescriptor {
    pub fn new(name: &str, help: &str, kind: MetricKind, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Resolve a caller-supplied label set into a series key: values in
    /// declared order. The supplied names must match the schema exactly
    /// (order-insensitive).
    pub(crate) fn series_key(&self, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        if labels.len() != self.label_names.len() {
            return Err(PulseError::InvalidValue(format!(
                "metric {}: expected {} label(s), got {}",
                self.name,
                self.label_names.len(),
                labels.len()
            )));
        }
        let mut key = Vec::with_capacity(self.label_names.len());
        for name in &self.label_names {
            let mut found = None;
            for (k, v) in labels {
                if *k == name.as_str() {
                    if found.is_some() {
                        return Err(PulseError::InvalidValue(format!(
                            "metric {}: duplicate label {name}",
                            self.name
                        )));
                    }
                    found = Some(*v);
                }
            }
            match found {
                Some(v) => key.push(v.to_string()),
                None => {
                    return Err(PulseError::InvalidValue(format!(
                        "metric {}: missing label {name}",
                        self.name
                    )))
                }
            }
        }
        Ok(key)
    }
}

/// Escape a label value for the text format.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape help text for the `# HELP` line.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format label pairs in declared order: `k1="v1",k2="v2"`.
fn label_str(names: &[String], values: &[String]) -> String {
    names
        .iter()
        .zip(values.iter())
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

enum Slot {
    Counter(Arc<CounterCore>),
    Histogram(Arc<HistogramCore>),
    Gauge(Arc<GaugeCore>),
}

impl Slot {
    fn desc(&self) -> &MetricDescriptor {
        match self {
            Slot::Counter(c) => &c.desc,
            Slot::Histogram(h) => &h.desc,
            Slot::Gauge(g) => &g.desc,
        }
    }

    fn render_into(&self, out: &mut String) {
        let d = self.desc();
        let _ = writeln!(out, "# HELP {} {}", d.name, escape_help(&d.help));
        let _ = writeln!(out, "# TYPE {} {}", d.name, d.kind.as_str());
        match self {
            Slot::Counter(core) => {
                let mut series: Vec<(Vec<String>, f64)> = core
                    .series
                    .iter()
                    .map(|r| (r.key().clone(), r.value().get()))
                    .collect();
                series.sort_by(|a, b| a.0.cmp(&b.0));
                for (key, value) in series {
                    if key.is_empty() {
                        let _ = writeln!(out, "{} {}", d.name, value);
                    } else {
                        let _ = writeln!(
                            out,
                            "{}{{{}}} {}",
                            d.name,
                            label_str(&d.label_names, &key),
                            value
                        );
                    }
                }
            }
            Slot::Histogram(core) => {
                // Snapshot narrowest bucket first and the total count last,
                // mirroring the writer's order, so the cumulative invariant
                // holds in every rendered series.
                let mut series: Vec<(Vec<String>, Vec<u64>, u64, f64)> = core
                    .series
                    .iter()
                    .map(|r| {
                        let s = r.value();
                        let buckets: Vec<u64> = s
                            .buckets
                            .iter()
                            .map(|b| b.load(std::sync::atomic::Ordering::Relaxed))
                            .collect();
                        let count = s.count.load(std::sync::atomic::Ordering::Relaxed);
                        (r.key().clone(), buckets, count, s.sum.get())
                    })
                    .collect();
                series.sort_by(|a, b| a.0.cmp(&b.0));
                for (key, buckets, count, sum) in series {
                    let labels = label_str(&d.label_names, &key);
                    let prefix = if labels.is_empty() {
                        String::new()
                    } else {
                        format!("{labels},")
                    };
                    for (i, &bound) in core.bounds.iter().enumerate() {
                        let _ = writeln!(
                            out,
                            "{}_bucket{{{}le=\"{}\"}} {}",
                            d.name, prefix, bound, buckets[i]
                        );
                    }
                    let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", d.name, prefix, count);
                    if labels.is_empty() {
                        let _ = writeln!(out, "{}_sum {}", d.name, sum);
                        let _ = writeln!(out, "{}_count {}", d.name, count);
                    } else {
                        let _ = writeln!(out, "{}_sum{{{labels}}} {}", d.name, sum);
                        let _ = writeln!(out, "{}_count{{{labels}}} {}", d.name, count);
                    }
                }
            }
            Slot::Gauge(core) => {
                let _ = writeln!(out, "{} {}", d.name, core.value.get());
            }
        }
    }
}

/// Owns every metric of the process and serializes their current state.
#[derive(Default)]
pub struct Registry {
    slots: RwLock<Vec<Slot>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, slot: Slot) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| PulseError::Internal("metric registry lock poisoned".into()))?;
        if slots.iter().any(|s| s.desc().name == slot.desc().name) {
            return Err(PulseError::DuplicateName(slot.desc().name.clone()));
        }
        slots.push(slot);
        Ok(())
    }

    /// Register a counter. Fails with [`PulseError::DuplicateName`] if the
    /// name is already taken.
    pub fn register_counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Counter> {
        let core = Arc::new(CounterCore {
            desc: MetricDescriptor::new(name, help, MetricKind::Counter, label_names),
            series: DashMap::new(),
        });
        self.insert(Slot::Counter(Arc::clone(&core)))?;
        Ok(Counter { core })
    }

    /// Register a histogram with fixed ascending bucket upper bounds.
    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        bounds: &[f64],
    ) -> Result<Histogram> {
        if bounds.is_empty() {
            return Err(PulseError::InvalidValue(format!(
                "histogram {name}: bucket bounds must not be empty"
            )));
        }
        if bounds.iter().any(|b| !b.is_finite()) || bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PulseError::InvalidValue(format!(
                "histogram {name}: bucket bounds must be finite and strictly ascending"
            )));
        }
        let core = Arc::new(HistogramCore {
            desc: MetricDescriptor::new(name, help, MetricKind::Histogram, label_names),
            bounds: bounds.to_vec(),
            series: DashMap::new(),
        });
        self.insert(Slot::Histogram(Arc::clone(&core)))?;
        Ok(Histogram { core })
    }

    /// Register an unlabeled gauge, starting at zero.
    pub fn register_gauge(&self, name: &str, help: &str) -> Result<Gauge> {
        let core = Arc::new(GaugeCore {
            desc: MetricDescriptor::new(name, help, MetricKind::Gauge, &[]),
            value: AtomicF64::new(0.0),
        });
        self.insert(Slot::Gauge(Arc::clone(&core)))?;
        Ok(Gauge { core })
    }

    /// Serialize every registered metric into the text exposition format.
    ///
    /// Defined for any reachable registry state; concurrent instrument
    /// updates commit atomically and show up in whichever scrape follows
    /// them. Registration never panics, so the lock cannot be poisoned; the
    /// fallback arm exists to keep this path infallible.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Ok(slots) = self.slots.read() {
            for slot in slots.iter() {
                slot.render_into(&mut out);
            }
        }
        out
    }
}
