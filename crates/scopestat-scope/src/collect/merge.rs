//! Multi-getter aggregation.
//!
//! Several vectors may register under one exported name (independent roots,
//! incarnations, re-declared vectors). The merged getter validates every
//! additional registration against the first and presents one series set:
//! a tag set seen once is relayed, a tag set seen several times is merged.
//! Counters and histograms are summed; gauges keep the last value observed
//! during the merge pass.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use scopestat_core::{
    HistogramValue, HistogramVectorGetter, Int64Value, Int64VectorGetter, MetricKind, Result,
    StatsError, Tags,
};

fn same_label_set(a: &[String], b: &[String]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Merged view over counter or gauge getters sharing a name.
pub struct MultiInt64Getter {
    name: String,
    kind: MetricKind,
    getters: RwLock<Vec<Arc<dyn Int64VectorGetter>>>,
}

impl MultiInt64Getter {
    pub fn new(name: &str, kind: MetricKind, first: Arc<dyn Int64VectorGetter>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            getters: RwLock::new(vec![first]),
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Add a registration; labels and kind must match the first one.
    pub fn append(&self, kind: MetricKind, getter: Arc<dyn Int64VectorGetter>) -> Result<()> {
        if kind != self.kind {
            return Err(StatsError::KindConflict {
                name: self.name.clone(),
                has: kind,
                want: self.kind,
            });
        }

        let mut getters = self.getters.write();
        if let Some(first) = getters.first() {
            let want = first.labels();
            let has = getter.labels();
            if !same_label_set(&has, &want) {
                return Err(StatsError::LabelConflict {
                    name: self.name.clone(),
                    has,
                    want,
                });
            }
        }

        getters.push(getter);
        Ok(())
    }

    /// Number of registrations merged.
    pub fn len(&self) -> usize {
        self.getters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Int64VectorGetter for MultiInt64Getter {
    fn labels(&self) -> Vec<String> {
        self.getters
            .read()
            .first()
            .map(|g| g.labels())
            .unwrap_or_default()
    }

    fn get(&self) -> Vec<Int64Value> {
        let getters = self.getters.read().clone();
        if getters.len() == 1 {
            return getters[0].get();
        }

        let mut merged: BTreeMap<Tags, i64> = BTreeMap::new();
        for g in &getters {
            for iv in g.get() {
                match merged.get_mut(&iv.tags) {
                    None => {
                        merged.insert(iv.tags, iv.value);
                    }
                    Some(v) => match self.kind {
                        MetricKind::Gauge => *v = iv.value,
                        _ => *v += iv.value,
                    },
                }
            }
        }

        merged
            .into_iter()
            .map(|(tags, value)| Int64Value { tags, value })
            .collect()
    }
}

/// Merged view over histogram getters sharing a name.
pub struct MultiHistogramGetter {
    name: String,
    getters: RwLock<Vec<Arc<dyn HistogramVectorGetter>>>,
}

impl MultiHistogramGetter {
    pub fn new(name: &str, first: Arc<dyn HistogramVectorGetter>) -> Self {
        Self {
            name: name.to_string(),
            getters: RwLock::new(vec![first]),
        }
    }

    /// Add a registration; labels and cutoffs must match the first one.
    pub fn append(&self, getter: Arc<dyn HistogramVectorGetter>) -> Result<()> {
        let mut getters = self.getters.write();
        if let Some(first) = getters.first() {
            let want = first.labels();
            let has = getter.labels();
            if !same_label_set(&has, &want) {
                return Err(StatsError::LabelConflict {
                    name: self.name.clone(),
                    has,
                    want,
                });
            }

            let want = first.cutoffs();
            let has = getter.cutoffs();
            if has != want {
                return Err(StatsError::CutoffConflict {
                    name: self.name.clone(),
                    has,
                    want,
                });
            }
        }

        getters.push(getter);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.getters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistogramVectorGetter for MultiHistogramGetter {
    fn labels(&self) -> Vec<String> {
        self.getters
            .read()
            .first()
            .map(|g| g.labels())
            .unwrap_or_default()
    }

    fn cutoffs(&self) -> Vec<f64> {
        self.getters
            .read()
            .first()
            .map(|g| g.cutoffs())
            .unwrap_or_default()
    }

    fn get(&self) -> Vec<HistogramValue> {
        let getters = self.getters.read().clone();
        if getters.len() == 1 {
            return getters[0].get();
        }

        let mut merged: BTreeMap<Tags, HistogramValue> = BTreeMap::new();
        for g in &getters {
            for hv in g.get() {
                match merged.get_mut(&hv.tags) {
                    None => {
                        merged.insert(hv.tags.clone(), hv);
                    }
                    Some(acc) => {
                        acc.count += hv.count;
                        acc.sum += hv.sum;
                        // Cutoffs are validated equal, so buckets line up.
                        for (a, b) in acc.buckets.iter_mut().zip(&hv.buckets) {
                            a.count += b.count;
                        }
                    }
                }
            }
        }

        merged.into_values().collect()
    }
}

#[derive(Clone)]
enum Merged {
    Int64(Arc<MultiInt64Getter>),
    Histogram(Arc<MultiHistogramGetter>),
}

/// Outcome of adding a getter to a [`GetterSet`].
pub enum Added<G> {
    /// First registration of the name; the merged getter was created.
    New(Arc<G>),
    /// Appended to an existing merged getter.
    Appended,
}

/// One merged getter per exported name.
#[derive(Default)]
pub struct GetterSet {
    by_name: Mutex<HashMap<String, Merged>>,
}

impl GetterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_int64(
        &self,
        name: &str,
        kind: MetricKind,
        getter: Arc<dyn Int64VectorGetter>,
    ) -> Result<Added<MultiInt64Getter>> {
        let mut by_name = self.by_name.lock();
        match by_name.get(name) {
            Some(Merged::Int64(m)) => {
                m.append(kind, getter)?;
                tracing::debug!(name, %kind, registrations = m.len(), "merged additional registration");
                Ok(Added::Appended)
            }
            Some(Merged::Histogram(_)) => Err(StatsError::KindConflict {
                name: name.to_string(),
                has: kind,
                want: MetricKind::Histogram,
            }),
            None => {
                let m = Arc::new(MultiInt64Getter::new(name, kind, getter));
                by_name.insert(name.to_string(), Merged::Int64(Arc::clone(&m)));
                Ok(Added::New(m))
            }
        }
    }

    pub fn add_histogram(
        &self,
        name: &str,
        getter: Arc<dyn HistogramVectorGetter>,
    ) -> Result<Added<MultiHistogramGetter>> {
        let mut by_name = self.by_name.lock();
        match by_name.get(name) {
            Some(Merged::Histogram(m)) => {
                m.append(getter)?;
                tracing::debug!(name, registrations = m.len(), "merged additional registration");
                Ok(Added::Appended)
            }
            Some(Merged::Int64(m)) => Err(StatsError::KindConflict {
                name: name.to_string(),
                has: MetricKind::Histogram,
                want: m.kind(),
            }),
            None => {
                let m = Arc::new(MultiHistogramGetter::new(name, getter));
                by_name.insert(name.to_string(), Merged::Histogram(Arc::clone(&m)));
                Ok(Added::New(m))
            }
        }
    }

    /// Forget `name`; the next registration creates a fresh merged getter.
    pub fn remove(&self, name: &str) -> bool {
        self.by_name.lock().remove(name).is_some()
    }

    /// Counter and gauge getters with their names.
    pub fn int64(&self) -> Vec<(String, Arc<MultiInt64Getter>)> {
        self.by_name
            .lock()
            .iter()
            .filter_map(|(n, m)| match m {
                Merged::Int64(g) => Some((n.clone(), Arc::clone(g))),
                Merged::Histogram(_) => None,
            })
            .collect()
    }

    pub fn histograms(&self) -> Vec<(String, Arc<MultiHistogramGetter>)> {
        self.by_name
            .lock()
            .iter()
            .filter_map(|(n, m)| match m {
                Merged::Histogram(g) => Some((n.clone(), Arc::clone(g))),
                Merged::Int64(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use scopestat_core::{Cutoffs, HistogramVector, Int64Vector, LabeledVector};

    #[test]
    fn gauges_keep_last_observed() {
        let a = Arc::new(Int64Vector::new(vec!["k".into()]));
        let b = Arc::new(Int64Vector::new(vec!["k".into()]));
        a.entity(&["v"]).unwrap().set(3);
        b.entity(&["v"]).unwrap().set(7);

        let m = MultiInt64Getter::new("g", MetricKind::Gauge, a);
        m.append(MetricKind::Gauge, b).unwrap();

        let got = m.get();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].value, 7);
    }

    #[test]
    fn labels_compare_without_order() {
        let a = Arc::new(Int64Vector::new(vec!["x".into(), "y".into()]));
        let b = Arc::new(Int64Vector::new(vec!["y".into(), "x".into()]));
        let c = Arc::new(Int64Vector::new(vec!["x".into()]));

        let m = MultiInt64Getter::new("c", MetricKind::Counter, a);
        m.append(MetricKind::Counter, b).unwrap();
        assert!(matches!(
            m.append(MetricKind::Counter, c),
            Err(StatsError::LabelConflict { .. })
        ));
        assert!(matches!(
            m.append(MetricKind::Gauge, Arc::new(Int64Vector::new(vec![]))),
            Err(StatsError::KindConflict { .. })
        ));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn histogram_buckets_are_summed() {
        let cutoffs = Cutoffs::custom(&[1.0, 10.0]).unwrap();
        let a = Arc::new(HistogramVector::new(vec![], cutoffs.clone()));
        let b = Arc::new(HistogramVector::new(vec![], cutoffs));
        let none: [&str; 0] = [];
        a.entity(&none).unwrap().record(0.5);
        b.entity(&none).unwrap().record(5.0);
        b.entity(&none).unwrap().record(50.0);

        let m = MultiHistogramGetter::new("h", a);
        m.append(b).unwrap();

        let got = m.get();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].count, 3);
        assert_eq!(got[0].sum, 55.5);
        let counts: Vec<i64> = got[0].buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1]);
    }

    #[test]
    fn histogram_cutoff_mismatch_is_rejected() {
        let a = Arc::new(HistogramVector::new(vec![], Cutoffs::default()));
        let b = Arc::new(HistogramVector::new(vec![], Cutoffs::custom(&[1.0]).unwrap()));
        let m = MultiHistogramGetter::new("h", a);
        assert!(matches!(m.append(b), Err(StatsError::CutoffConflict { .. })));
    }

    #[test]
    fn set_rejects_cross_kind_names() {
        let set = GetterSet::new();
        let counter = Arc::new(Int64Vector::new(vec![]));
        let histogram = Arc::new(HistogramVector::new(vec![], Cutoffs::default()));

        assert!(matches!(
            set.add_int64("x", MetricKind::Counter, counter).unwrap(),
            Added::New(_)
        ));
        assert!(matches!(
            set.add_histogram("x", histogram),
            Err(StatsError::KindConflict { .. })
        ));
    }
}
