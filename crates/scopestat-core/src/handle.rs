//! Caller-facing metric handles.
//!
//! Each handle is either `Live` (backed by a vector entry) or `Discard`
//! (metrics disabled). The variant is picked once when the handle is built;
//! mutation on a live handle is a single atomic operation.

use std::sync::Arc;

use crate::atomic::AtomicInt64;
use crate::histogram::{Bucket, HistogramCell};

/// Monotonically increasing `i64`.
#[derive(Debug, Clone)]
pub enum Counter {
    Live(Arc<AtomicInt64>),
    Discard,
}

impl Counter {
    pub fn inc(&self) {
        self.add(1);
    }

    /// Add `v`. Negative deltas are ignored so the counter never decreases.
    pub fn add(&self, v: i64) {
        if v < 0 {
            return;
        }
        if let Counter::Live(c) = self {
            c.add(v);
        }
    }

    pub fn get(&self) -> i64 {
        match self {
            Counter::Live(c) => c.get(),
            Counter::Discard => 0,
        }
    }
}

impl From<Arc<AtomicInt64>> for Counter {
    fn from(c: Arc<AtomicInt64>) -> Self {
        Counter::Live(c)
    }
}

/// Settable `i64`.
#[derive(Debug, Clone)]
pub enum Gauge {
    Live(Arc<AtomicInt64>),
    Discard,
}

impl Gauge {
    pub fn update(&self, v: i64) {
        if let Gauge::Live(g) = self {
            g.set(v);
        }
    }

    pub fn add(&self, v: i64) {
        if let Gauge::Live(g) = self {
            g.add(v);
        }
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn dec(&self) {
        self.add(-1);
    }

    pub fn get(&self) -> i64 {
        match self {
            Gauge::Live(g) => g.get(),
            Gauge::Discard => 0,
        }
    }
}

impl From<Arc<AtomicInt64>> for Gauge {
    fn from(g: Arc<AtomicInt64>) -> Self {
        Gauge::Live(g)
    }
}

/// Fixed-bucket distribution.
#[derive(Debug, Clone)]
pub enum Histogram {
    Live(Arc<HistogramCell>),
    Discard,
}

impl Histogram {
    pub fn record(&self, v: f64) {
        if let Histogram::Live(h) = self {
            h.record(v);
        }
    }

    pub fn count(&self) -> i64 {
        match self {
            Histogram::Live(h) => h.count(),
            Histogram::Discard => 0,
        }
    }

    pub fn sum(&self) -> f64 {
        match self {
            Histogram::Live(h) => h.sum(),
            Histogram::Discard => 0.0,
        }
    }

    pub fn buckets(&self) -> Vec<Bucket> {
        match self {
            Histogram::Live(h) => h.buckets(),
            Histogram::Discard => Vec::new(),
        }
    }
}

impl From<Arc<HistogramCell>> for Histogram {
    fn from(h: Arc<HistogramCell>) -> Self {
        Histogram::Live(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_ignores_negative_deltas() {
        let c = Counter::from(Arc::new(AtomicInt64::default()));
        c.add(5);
        c.add(-3);
        c.inc();
        assert_eq!(c.get(), 6);
    }

    #[test]
    fn gauge_accepts_negative_deltas() {
        let g = Gauge::from(Arc::new(AtomicInt64::default()));
        g.update(5);
        g.add(-3);
        assert_eq!(g.get(), 2);
    }
}
