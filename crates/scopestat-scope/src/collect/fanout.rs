//! Forward every registration to several collectors.

use std::sync::Arc;

use scopestat_core::{Collector, HistogramVectorGetter, Int64VectorGetter, Result};

pub struct FanoutCollector {
    collectors: Vec<Arc<dyn Collector>>,
}

impl FanoutCollector {
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self { collectors }
    }
}

/// Single collector for `collectors`: `None` when empty, the collector itself
/// when there is one, a fan-out otherwise.
pub fn wrap_collectors(mut collectors: Vec<Arc<dyn Collector>>) -> Option<Arc<dyn Collector>> {
    match collectors.len() {
        0 => None,
        1 => collectors.pop(),
        _ => Some(Arc::new(FanoutCollector::new(collectors))),
    }
}

impl Collector for FanoutCollector {
    fn register_counter(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        for c in &self.collectors {
            c.register_counter(name, Arc::clone(&getter))?;
        }
        Ok(())
    }

    fn register_gauge(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        for c in &self.collectors {
            c.register_gauge(name, Arc::clone(&getter))?;
        }
        Ok(())
    }

    fn register_histogram(
        &self,
        name: &str,
        getter: Arc<dyn HistogramVectorGetter>,
    ) -> Result<()> {
        for c in &self.collectors {
            c.register_histogram(name, Arc::clone(&getter))?;
        }
        Ok(())
    }

    /// Stops at the first collector failing to close.
    fn close(&self) -> Result<()> {
        for c in &self.collectors {
            c.close()?;
        }
        Ok(())
    }
}
