//! Adapter giving a backend exactly one getter per exported name.

use std::sync::Arc;

use scopestat_core::{
    Collector, HistogramVectorGetter, Int64VectorGetter, MetricKind, Result,
};

use super::merge::{Added, GetterSet};

/// Wraps a backend that expects each name to be registered once.
///
/// The first registration of a name forwards a merged getter to the backend;
/// later ones are validated and appended to it. If the backend rejects the
/// forward, the name is dropped again so the next registration retries.
pub struct MergingCollector<C> {
    inner: C,
    getters: GetterSet,
}

impl<C: Collector> MergingCollector<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            getters: GetterSet::new(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn register_int64(
        &self,
        name: &str,
        kind: MetricKind,
        getter: Arc<dyn Int64VectorGetter>,
    ) -> Result<()> {
        match self.getters.add_int64(name, kind, getter)? {
            Added::New(merged) if kind == MetricKind::Gauge => {
                self.forwarded(name, self.inner.register_gauge(name, merged))
            }
            Added::New(merged) => self.forwarded(name, self.inner.register_counter(name, merged)),
            Added::Appended => Ok(()),
        }
    }

    fn forwarded(&self, name: &str, res: Result<()>) -> Result<()> {
        if let Err(e) = &res {
            self.getters.remove(name);
            tracing::warn!(name, error = %e, "backend rejected registration");
        }
        res
    }
}

impl<C: Collector> Collector for MergingCollector<C> {
    fn register_counter(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        self.register_int64(name, MetricKind::Counter, getter)
    }

    fn register_gauge(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        self.register_int64(name, MetricKind::Gauge, getter)
    }

    fn register_histogram(
        &self,
        name: &str,
        getter: Arc<dyn HistogramVectorGetter>,
    ) -> Result<()> {
        match self.getters.add_histogram(name, getter)? {
            Added::New(merged) => {
                self.forwarded(name, self.inner.register_histogram(name, merged))
            }
            Added::Appended => Ok(()),
        }
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }
}
