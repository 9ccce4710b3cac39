//! scopestat scopes: namespaced, tag-inherited metric declarations.
//!
//! A [`Scope`] turns a local declaration (`counter("hits")`) into a qualified
//! name and a tag prefix, then resolves it to the one shared vector for that
//! name under the scope's root. Roots register each vector with a
//! [`Collector`](scopestat_core::Collector) once; collectors in [`collect`]
//! merge repeated registrations of one name into a single series view.
//!
//! Misuse (wrong label count, reserved labels, conflicting redeclarations)
//! panics through the plain API; every such call has a `try_` twin returning
//! [`StatsError`](scopestat_core::StatsError).

mod binding;
mod fail;
mod registry;

pub mod collect;
pub mod config;
pub mod incarnation;
pub mod instrument;
pub mod scope;
pub mod timer;
pub mod vector;

pub use binding::BoundVector;
pub use collect::{FanoutCollector, MergingCollector, Snapshot, StaticCollector};
pub use incarnation::{IncarnationKey, IncarnationRegistry, DEFAULT_INCARNATION_KEY};
pub use instrument::{Instrument, InstrumentOpts, InstrumentVector};
pub use scope::{HistogramOpts, Scope};
pub use timer::{StopWatch, Timer, TimerOpts, TimerVector};
pub use vector::{CounterVec, GaugeVec, HistogramVec};
