//! Read-side contracts handed to collectors.
//!
//! A getter is called on demand by the exporting backend and returns the
//! current value of every series in one vector. Tags are kept in a `BTreeMap`
//! so label order is deterministic.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::histogram::Bucket;

/// Tag set of one series.
pub type Tags = BTreeMap<String, String>;

/// Current value of one counter or gauge series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Int64Value {
    pub tags: Tags,
    pub value: i64,
}

/// Current state of one histogram series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramValue {
    pub tags: Tags,
    pub count: i64,
    pub sum: f64,
    pub buckets: Vec<Bucket>,
}

/// Read access to a counter or gauge vector.
pub trait Int64VectorGetter: Send + Sync {
    /// Label names of the vector.
    fn labels(&self) -> Vec<String>;
    /// All series with their tags.
    fn get(&self) -> Vec<Int64Value>;
}

/// Read access to a histogram vector.
pub trait HistogramVectorGetter: Send + Sync {
    fn labels(&self) -> Vec<String>;
    /// Bucket upper bounds, terminal `+inf` included.
    fn cutoffs(&self) -> Vec<f64>;
    fn get(&self) -> Vec<HistogramValue>;
}
