//! Backend-facing registration contract.

use std::sync::Arc;

use crate::error::Result;
use crate::getter::{HistogramVectorGetter, Int64VectorGetter};

/// Receives one getter per exported metric name.
///
/// Implemented by exporting backends. Registration may be called several
/// times for one name; a backend that cannot merge series must reject the
/// later registration with a configuration conflict.
///
/// Registration runs while the declaring root holds the table slot of the
/// name being registered. An implementation must not declare metrics
/// through that same root from inside `register_*`; a backend that
/// instruments itself does so through a root of its own.
pub trait Collector: Send + Sync {
    fn register_counter(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()>;

    fn register_gauge(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()>;

    fn register_histogram(&self, name: &str, getter: Arc<dyn HistogramVectorGetter>)
        -> Result<()>;

    /// Release backend resources.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl<C: Collector + ?Sized> Collector for Arc<C> {
    fn register_counter(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        (**self).register_counter(name, getter)
    }

    fn register_gauge(&self, name: &str, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        (**self).register_gauge(name, getter)
    }

    fn register_histogram(
        &self,
        name: &str,
        getter: Arc<dyn HistogramVectorGetter>,
    ) -> Result<()> {
        (**self).register_histogram(name, getter)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}
