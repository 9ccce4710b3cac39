use std::sync::Arc;

use crate::error::Result;
use crate::getter::{HistogramValue, HistogramVectorGetter, Tags};
use crate::histogram::{Cutoffs, HistogramCell};

use super::{EntityVector, LabeledVector};

/// Label-indexed histograms sharing one set of cutoffs.
pub struct HistogramVector {
    inner: EntityVector<HistogramCell>,
    cutoffs: Cutoffs,
}

impl HistogramVector {
    pub fn new(labels: Vec<String>, cutoffs: Cutoffs) -> Self {
        let shared = cutoffs.clone();
        Self {
            inner: EntityVector::new(labels, move |_: &Tags| {
                Ok(HistogramCell::new(shared.clone()))
            }),
            cutoffs,
        }
    }

    pub fn cutoffs(&self) -> &Cutoffs {
        &self.cutoffs
    }
}

impl LabeledVector for HistogramVector {
    type Entity = Arc<HistogramCell>;

    fn labels(&self) -> &[String] {
        self.inner.labels()
    }

    fn entity<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<HistogramCell>> {
        self.inner.entity(values)
    }
}

impl HistogramVectorGetter for HistogramVector {
    fn labels(&self) -> Vec<String> {
        self.inner.labels().to_vec()
    }

    fn cutoffs(&self) -> Vec<f64> {
        self.cutoffs.as_slice().to_vec()
    }

    fn get(&self) -> Vec<HistogramValue> {
        self.inner
            .entries()
            .into_iter()
            .map(|(tags, h)| HistogramValue {
                tags,
                count: h.count(),
                sum: h.sum(),
                buckets: h.buckets(),
            })
            .collect()
    }
}
