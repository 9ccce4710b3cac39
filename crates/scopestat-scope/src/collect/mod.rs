//! Collector implementations and multi-registration merging.

pub mod fanout;
pub mod merge;
pub mod merging;
pub mod static_collector;

pub use fanout::{wrap_collectors, FanoutCollector};
pub use merge::{GetterSet, MultiHistogramGetter, MultiInt64Getter};
pub use merging::MergingCollector;
pub use static_collector::{HistogramSnapshot, Int64Snapshot, Snapshot, StaticCollector};
