//! Fixed-bucket histogram cells.
//!
//! Buckets are non-cumulative: an observation increments only the first
//! bucket whose cutoff is `>=` the value. The last cutoff is always `+inf`, so
//! every non-NaN observation lands in exactly one bucket. The total count is
//! derived from the buckets and never stored on its own.

use std::sync::Arc;

use serde::Serialize;

use crate::atomic::{AtomicF64, AtomicInt64};
use crate::error::{Result, StatsError};

/// Default bucket cutoffs (seconds-oriented).
pub const DEFAULT_CUTOFFS: [f64; 12] = [
    0.005,
    0.01,
    0.025,
    0.05,
    0.1,
    0.25,
    0.5,
    1.0,
    2.5,
    5.0,
    10.0,
    f64::INFINITY,
];

/// Ascending bucket cutoffs terminated by `+inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cutoffs(Arc<[f64]>);

impl Default for Cutoffs {
    fn default() -> Self {
        Self(Arc::from(&DEFAULT_CUTOFFS[..]))
    }
}

impl Cutoffs {
    /// Build cutoffs from finite upper bounds; `+inf` is appended.
    ///
    /// A trailing `+inf` supplied by the caller is not duplicated.
    pub fn custom(cutoffs: &[f64]) -> Result<Self> {
        let mut finite: Vec<f64> = cutoffs.to_vec();
        while finite.last() == Some(&f64::INFINITY) {
            finite.pop();
        }

        let ascending = finite.windows(2).all(|w| w[0] < w[1]);
        if !ascending || finite.iter().any(|c| c.is_nan() || c.is_infinite()) {
            return Err(StatsError::InvalidCutoffs(cutoffs.to_vec()));
        }

        finite.push(f64::INFINITY);
        Ok(Self(Arc::from(finite)))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One bucket of a histogram snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    pub count: i64,
    pub upper_bound: f64,
}

/// Live histogram state: parallel atomic counts plus an atomic sum.
#[derive(Debug)]
pub struct HistogramCell {
    cutoffs: Cutoffs,
    counts: Box<[AtomicInt64]>,
    sum: AtomicF64,
}

impl HistogramCell {
    pub fn new(cutoffs: Cutoffs) -> Self {
        let counts = (0..cutoffs.len()).map(|_| AtomicInt64::default()).collect();
        Self {
            cutoffs,
            counts,
            sum: AtomicF64::default(),
        }
    }

    /// Record one observation. NaN is not an observation and is dropped.
    pub fn record(&self, v: f64) {
        if let Some(i) = self.cutoffs.as_slice().iter().position(|&c| v <= c) {
            self.counts[i].inc();
            self.sum.add(v);
        }
    }

    pub fn count(&self) -> i64 {
        self.counts.iter().map(AtomicInt64::get).sum()
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    pub fn cutoffs(&self) -> &Cutoffs {
        &self.cutoffs
    }

    pub fn buckets(&self) -> Vec<Bucket> {
        self.cutoffs
            .as_slice()
            .iter()
            .zip(self.counts.iter())
            .map(|(&upper_bound, c)| Bucket {
                count: c.get(),
                upper_bound,
            })
            .collect()
    }
}
