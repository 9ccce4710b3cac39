//! In-memory collector for tests and debugging.

use std::sync::Arc;

use serde::Serialize;

use scopestat_core::{
    Collector, HistogramValue, HistogramVectorGetter, Int64VectorGetter, MetricKind, Result,
    StatsError, Tags,
};

use super::merge::GetterSet;

/// Value of one counter or gauge series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Int64Snapshot {
    pub name: String,
    pub labels: Tags,
    pub value: i64,
}

/// Value of one histogram series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    pub name: String,
    pub value: HistogramValue,
}

/// Every registered series at one point in time, sorted by name then tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub counters: Vec<Int64Snapshot>,
    pub gauges: Vec<Int64Snapshot>,
    pub histograms: Vec<HistogramSnapshot>,
}

/// Keeps every registration and merges repeated names.
#[derive(Default)]
pub struct StaticCollector {
    getters: GetterSet,
}

impl StaticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::default();

        for (name, g) in self.getters.int64() {
            let out = match g.kind() {
                MetricKind::Gauge => &mut snap.gauges,
                _ => &mut snap.counters,
            };
            out.extend(g.get().into_iter().map(|v| Int64Snapshot {
                name: name.clone(),
                labels: v.tags,
                value: v.value,
            }));
        }

        for (name, g) in self.getters.histograms() {
            snap.histograms.extend(g.get().into_iter().map(|value| HistogramSnapshot {
                name: name.clone(),
                value,
            }));
        }

        snap.counters
            .sort_by(|a, b| (&a.name, &a.labels).cmp(&(&b.name, &b.labels)));
        snap.gauges
            .sort_by(|a, b| (&a.name, &a.labels).cmp(&(&b.name, &b.labels)));
        snap.histograms
            .sort_by(|a, b| (&a.name, &a.value.tags).cmp(&(&b.name, &b.value.tags)));
        snap
    }

    /// Snapshot as JSON. Non-finite bucket bounds encode as `null`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.snapshot())
            .map_err(|e| StatsError::Internal(format!("encode snapshot failed: {e}")))
    }
}

impl Collector for StaticCollector {
    fn register_counter(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        self.getters
            .add_int64(name, MetricKind::Counter, getter)
            .map(|_| ())
    }

    fn register_gauge(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        self.getters
            .add_int64(name, MetricKind::Gauge, getter)
            .map(|_| ())
    }

    fn register_histogram(
        &self,
        name: &str,
        getter: Arc<dyn HistogramVectorGetter>,
    ) -> Result<()> {
        self.getters.add_histogram(name, getter).map(|_| ())
    }
}
