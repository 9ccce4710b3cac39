//! Scope-bound vector handles.
//!
//! `with_labels` fails fast on a wrong value count; `try_with_labels` returns
//! the error instead.

use scopestat_core::{
    Counter, Gauge, Histogram, HistogramVector, Int64Vector, Result,
};

use crate::binding::BoundVector;
use crate::fail::fail_fast;

const NO_VALUES: &[&str] = &[];

/// Counter family declared through a scope.
#[derive(Clone)]
pub enum CounterVec {
    Live(BoundVector<Int64Vector>),
    Discard,
}

impl CounterVec {
    pub fn try_with_labels<S: AsRef<str>>(&self, values: &[S]) -> Result<Counter> {
        match self {
            CounterVec::Live(v) => v.fetch(values).map(Counter::from),
            CounterVec::Discard => Ok(Counter::Discard),
        }
    }

    #[track_caller]
    pub fn with_labels<S: AsRef<str>>(&self, values: &[S]) -> Counter {
        fail_fast(self.try_with_labels(values))
    }

    /// The series of a vector declared without labels.
    pub fn try_unlabeled(&self) -> Result<Counter> {
        self.try_with_labels(NO_VALUES)
    }

    #[track_caller]
    pub fn unlabeled(&self) -> Counter {
        fail_fast(self.try_unlabeled())
    }
}

/// Gauge family declared through a scope.
#[derive(Clone)]
pub enum GaugeVec {
    Live(BoundVector<Int64Vector>),
    Discard,
}

impl GaugeVec {
    pub fn try_with_labels<S: AsRef<str>>(&self, values: &[S]) -> Result<Gauge> {
        match self {
            GaugeVec::Live(v) => v.fetch(values).map(Gauge::from),
            GaugeVec::Discard => Ok(Gauge::Discard),
        }
    }

    #[track_caller]
    pub fn with_labels<S: AsRef<str>>(&self, values: &[S]) -> Gauge {
        fail_fast(self.try_with_labels(values))
    }

    /// The series of a vector declared without labels.
    pub fn try_unlabeled(&self) -> Result<Gauge> {
        self.try_with_labels(NO_VALUES)
    }

    #[track_caller]
    pub fn unlabeled(&self) -> Gauge {
        fail_fast(self.try_unlabeled())
    }
}

/// Histogram family declared through a scope.
#[derive(Clone)]
pub enum HistogramVec {
    Live(BoundVector<HistogramVector>),
    Discard,
}

impl HistogramVec {
    pub fn try_with_labels<S: AsRef<str>>(&self, values: &[S]) -> Result<Histogram> {
        match self {
            HistogramVec::Live(v) => v.fetch(values).map(Histogram::from),
            HistogramVec::Discard => Ok(Histogram::Discard),
        }
    }

    #[track_caller]
    pub fn with_labels<S: AsRef<str>>(&self, values: &[S]) -> Histogram {
        fail_fast(self.try_with_labels(values))
    }

    /// The series of a vector declared without labels.
    pub fn try_unlabeled(&self) -> Result<Histogram> {
        self.try_with_labels(NO_VALUES)
    }

    #[track_caller]
    pub fn unlabeled(&self) -> Histogram {
        fail_fast(self.try_unlabeled())
    }
}
