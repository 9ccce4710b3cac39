//! Per-root `exported name -> vector` table.
//!
//! The first declaration of a name creates its vector and registers the
//! vector's getter with the collector. Every later declaration, from any scope
//! under the same root, resolves to that vector.
//!
//! The collector is called with the name's shard locked, so a vector never
//! exists without its registration. Collectors must not declare through the
//! root that is registering with them.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use scopestat_core::{
    Collector, Cutoffs, HistogramVector, Int64Vector, LabeledVector, MetricKind, Result,
    StatsError,
};

enum Family {
    Counter(Arc<Int64Vector>),
    Gauge(Arc<Int64Vector>),
    Histogram(Arc<HistogramVector>),
}

impl Family {
    fn kind(&self) -> MetricKind {
        match self {
            Family::Counter(_) => MetricKind::Counter,
            Family::Gauge(_) => MetricKind::Gauge,
            Family::Histogram(_) => MetricKind::Histogram,
        }
    }

    fn as_int64(&self, name: &str, kind: MetricKind) -> Result<Arc<Int64Vector>> {
        match (kind, self) {
            (MetricKind::Counter, Family::Counter(v)) | (MetricKind::Gauge, Family::Gauge(v)) => {
                Ok(Arc::clone(v))
            }
            _ => Err(StatsError::KindConflict {
                name: name.to_string(),
                has: kind,
                want: self.kind(),
            }),
        }
    }

    fn as_histogram(&self, name: &str, cutoffs: &Cutoffs) -> Result<Arc<HistogramVector>> {
        match self {
            Family::Histogram(v) if v.cutoffs() == cutoffs => Ok(Arc::clone(v)),
            Family::Histogram(v) => Err(StatsError::CutoffConflict {
                name: name.to_string(),
                has: cutoffs.as_slice().to_vec(),
                want: v.cutoffs().as_slice().to_vec(),
            }),
            other => Err(StatsError::KindConflict {
                name: name.to_string(),
                has: MetricKind::Histogram,
                want: other.kind(),
            }),
        }
    }
}

pub(crate) struct VectorRegistry {
    families: DashMap<String, Family>,
    collector: Arc<dyn Collector>,
}

impl VectorRegistry {
    pub(crate) fn new(collector: Arc<dyn Collector>) -> Self {
        Self {
            families: DashMap::new(),
            collector,
        }
    }

    /// Counter or gauge vector for `name`, created with `labels` on first use.
    pub(crate) fn int64(
        &self,
        kind: MetricKind,
        name: &str,
        labels: Vec<String>,
    ) -> Result<Arc<Int64Vector>> {
        if let Some(f) = self.families.get(name) {
            return f.as_int64(name, kind);
        }

        match self.families.entry(name.to_string()) {
            Entry::Occupied(e) => e.get().as_int64(name, kind),
            Entry::Vacant(e) => {
                let vector = Arc::new(Int64Vector::new(labels));
                match kind {
                    MetricKind::Gauge => {
                        self.collector.register_gauge(name, vector.clone())?;
                        e.insert(Family::Gauge(Arc::clone(&vector)));
                    }
                    _ => {
                        self.collector.register_counter(name, vector.clone())?;
                        e.insert(Family::Counter(Arc::clone(&vector)));
                    }
                }
                tracing::debug!(name, %kind, labels = ?vector.labels(), "metric vector created");
                Ok(vector)
            }
        }
    }

    /// Histogram vector for `name`; cutoffs must match the first declaration.
    pub(crate) fn histogram(
        &self,
        name: &str,
        labels: Vec<String>,
        cutoffs: &Cutoffs,
    ) -> Result<Arc<HistogramVector>> {
        if let Some(f) = self.families.get(name) {
            return f.as_histogram(name, cutoffs);
        }

        match self.families.entry(name.to_string()) {
            Entry::Occupied(e) => e.get().as_histogram(name, cutoffs),
            Entry::Vacant(e) => {
                let vector = Arc::new(HistogramVector::new(labels, cutoffs.clone()));
                self.collector.register_histogram(name, vector.clone())?;
                e.insert(Family::Histogram(Arc::clone(&vector)));
                tracing::debug!(name, cutoffs = ?cutoffs.as_slice(), "histogram vector created");
                Ok(vector)
            }
        }
    }
}
