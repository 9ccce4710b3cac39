//! scopestat core: label-indexed metric vectors and the collector contract.
//!
//! This crate holds the lock-free metric cells, the reversible label
//! marshaler, the generic lookup-or-create vector and the getter surface that
//! exporting backends consume. It carries no scope or naming logic so it can
//! be reused under other front-ends.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every misuse surfaces as a `StatsError`; deciding to fail fast is left to
//! the caller.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod atomic;
pub mod collector;
pub mod error;
pub mod getter;
pub mod handle;
pub mod histogram;
pub mod marshal;
pub mod vector;

pub use collector::Collector;
pub use error::{ErrorClass, MetricKind, Result, StatsError};
pub use getter::{HistogramValue, HistogramVectorGetter, Int64Value, Int64VectorGetter, Tags};
pub use handle::{Counter, Gauge, Histogram};
pub use histogram::{Bucket, Cutoffs, DEFAULT_CUTOFFS};
pub use vector::{EntityVector, HistogramVector, Int64Vector, LabeledVector};
