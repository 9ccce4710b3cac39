//! Top-level facade crate for scopestat.
//!
//! Re-exports the core vectors and the scope layer so users can depend on a single crate.

pub mod core {
    pub use scopestat_core::*;
}

pub mod scope {
    pub use scopestat_scope::*;
}

pub use scopestat_core::{Collector, Counter, Cutoffs, Gauge, Histogram, Result, StatsError};
pub use scopestat_scope::{HistogramOpts, Scope, StaticCollector};
