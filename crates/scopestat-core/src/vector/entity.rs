use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Result, StatsError};
use crate::getter::Tags;
use crate::marshal::LabelMarshaler;

type Factory<M> = Box<dyn Fn(&Tags) -> Result<M> + Send + Sync>;

/// Concurrent `label values -> entry` registry.
///
/// Reads go straight to the sharded map. On a miss the entry is built outside
/// any lock and inserted only if the key is still vacant, so concurrent first
/// callers converge on one winner and the losers drop their copy. Entries are
/// never removed.
pub struct EntityVector<M> {
    labels: Vec<String>,
    entities: DashMap<u64, Arc<M>>,
    marshaler: LabelMarshaler,
    factory: Factory<M>,
}

impl<M> EntityVector<M> {
    /// `factory` receives the `label -> value` map of the entry it builds and
    /// must not have side effects besides producing the value.
    pub fn new<F>(labels: Vec<String>, factory: F) -> Self
    where
        F: Fn(&Tags) -> Result<M> + Send + Sync + 'static,
    {
        Self {
            labels,
            entities: DashMap::new(),
            marshaler: LabelMarshaler::new(),
            factory: Box::new(factory),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn entity<S: AsRef<str>>(&self, values: &[S]) -> Result<Arc<M>> {
        if values.len() != self.labels.len() {
            return Err(StatsError::label_mismatch(&self.labels, values));
        }

        let key = self.marshaler.marshal(values);
        if let Some(e) = self.entities.get(&key) {
            return Ok(Arc::clone(e.value()));
        }

        let tags: Tags = self
            .labels
            .iter()
            .cloned()
            .zip(values.iter().map(|v| v.as_ref().to_string()))
            .collect();
        let fresh = Arc::new((self.factory)(&tags)?);

        let winner = self.entities.entry(key).or_insert(fresh);
        Ok(Arc::clone(winner.value()))
    }

    /// Snapshot of every entry with its tags.
    pub fn entries(&self) -> Vec<(Tags, Arc<M>)> {
        let keyed: Vec<(u64, Arc<M>)> = self
            .entities
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();

        keyed
            .into_iter()
            .filter_map(|(key, m)| match self.marshaler.unmarshal(key, self.labels.len()) {
                Some(values) => Some((self.tags_of(&values), m)),
                None => {
                    tracing::warn!(key, labels = ?self.labels, "vector entry without label tuple");
                    None
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn tags_of(&self, values: &[String]) -> Tags {
        let mut tags = BTreeMap::new();
        for (name, value) in self.labels.iter().zip(values) {
            tags.insert(name.clone(), value.clone());
        }
        tags
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn factory_sees_label_map() {
        let v = EntityVector::new(vec!["a".into(), "b".into()], |tags: &Tags| {
            Ok(format!("{}-{}", tags["a"], tags["b"]))
        });
        assert_eq!(*v.entity(&["x", "y"]).unwrap(), "x-y");
    }

    #[test]
    fn hit_does_not_rebuild() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let v = EntityVector::new(vec!["a".into()], move |_: &Tags| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        let first = v.entity(&["x"]).unwrap();
        let second = v.entity(&["x"]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::Relaxed), 1);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn wrong_value_count_is_rejected() {
        let v = EntityVector::new(vec!["a".into()], |_: &Tags| Ok(()));
        let err = v.entity(&["x", "y"]).unwrap_err();
        assert!(matches!(err, StatsError::LabelMismatch { .. }));
        let none: [&str; 0] = [];
        assert!(v.entity(&none).is_err());
        assert!(v.is_empty());
    }

    #[test]
    fn factory_error_propagates() {
        let v: EntityVector<()> = EntityVector::new(vec![], |_: &Tags| {
            Err(StatsError::Config("boom".into()))
        });
        let none: [&str; 0] = [];
        assert_eq!(v.entity(&none).unwrap_err(), StatsError::Config("boom".into()));
        assert!(v.entries().is_empty());
    }
}
