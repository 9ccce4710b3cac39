use std::sync::Arc;

use crate::atomic::AtomicInt64;
use crate::error::Result;
use crate::getter::{Int64Value, Int64VectorGetter, Tags};

use super::{EntityVector, LabeledVector};

/// Label-indexed `i64` cells shared by counters and gauges.
pub struct Int64Vector {
    inner: EntityVector<AtomicInt64>,
}

impl Int64Vector {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            inner: EntityVector::new(labels, |_: &Tags| Ok(AtomicInt64::default())),
        }
    }

    /// Number of live series.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl LabeledVector for Int64Vector {
    type Entity = Arc<AtomicInt64>;

    fn labels(&self) -> &[String] {
        self.inner.labels()
    }

    fn entity<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<AtomicInt64>> {
        self.inner.entity(values)
    }
}

impl Int64VectorGetter for Int64Vector {
    fn labels(&self) -> Vec<String> {
        self.inner.labels().to_vec()
    }

    fn get(&self) -> Vec<Int64Value> {
        self.inner
            .entries()
            .into_iter()
            .map(|(tags, cell)| Int64Value {
                tags,
                value: cell.get(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn getter_reports_tags_and_values() {
        let v = Int64Vector::new(vec!["method".into(), "code".into()]);
        v.entity(&["GET", "200"]).unwrap().add(3);
        v.entity(&["GET", "200"]).unwrap().inc();
        v.entity(&["POST", "500"]).unwrap().inc();

        let mut got = Int64VectorGetter::get(&v);
        got.sort_by(|a, b| a.tags.cmp(&b.tags));

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].tags["method"], "GET");
        assert_eq!(got[0].tags["code"], "200");
        assert_eq!(got[0].value, 4);
        assert_eq!(got[1].tags["method"], "POST");
        assert_eq!(got[1].value, 1);
        assert_eq!(Int64VectorGetter::labels(&v), vec!["method", "code"]);
    }
}
