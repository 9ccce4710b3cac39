//! Call-site view over a shared vector.
//!
//! A declaration site knows its scope tags, its own label names and maybe an
//! incarnation registry. The shared vector only knows the label names it was
//! created with. [`Binding`] turns the values a caller passes into the value
//! tuple the vector expects.

use std::sync::Arc;

use scopestat_core::{LabeledVector, Result, StatsError, Tags};

use crate::incarnation::{IncarnationKey, IncarnationRegistry};

enum Layout {
    /// Site names equal the vector's names.
    Direct,
    /// Same names, other order: `out[i] = site_values[order[i]]`.
    Reordered(Vec<usize>),
    /// Names the vector was created with.
    Mismatch(Vec<String>),
}

pub(crate) struct Binding {
    qualified: String,
    prefix: Tags,
    labels: Vec<String>,
    incarnation: Option<Arc<IncarnationRegistry>>,
    layout: Layout,
}

impl Binding {
    /// Full label names of a site: scope tag names, then caller labels, then
    /// the incarnation key.
    pub(crate) fn site_names(
        prefix: &Tags,
        labels: &[&str],
        incarnation: Option<&IncarnationRegistry>,
    ) -> Result<Vec<String>> {
        let mut names: Vec<String> = prefix.keys().cloned().collect();

        for &label in labels {
            if incarnation.is_some_and(|r| r.key() == label) {
                return Err(StatsError::ReservedLabel(label.to_string()));
            }
            if names.iter().any(|n| n == label) {
                return Err(StatsError::DuplicateLabel(label.to_string()));
            }
            names.push(label.to_string());
        }

        if let Some(r) = incarnation {
            if prefix.contains_key(r.key()) {
                return Err(StatsError::ReservedLabel(r.key().to_string()));
            }
            names.push(r.key().to_string());
        }

        Ok(names)
    }

    pub(crate) fn new(
        qualified: String,
        prefix: Tags,
        labels: &[&str],
        incarnation: Option<Arc<IncarnationRegistry>>,
        site_names: &[String],
        vector_names: &[String],
    ) -> Self {
        let layout = if site_names == vector_names {
            Layout::Direct
        } else {
            let order: Option<Vec<usize>> = vector_names
                .iter()
                .map(|n| site_names.iter().position(|s| s == n))
                .collect();
            match order {
                Some(order) if site_names.len() == vector_names.len() => Layout::Reordered(order),
                _ => {
                    tracing::warn!(
                        name = %qualified,
                        site = ?site_names,
                        vector = ?vector_names,
                        "metric declared with labels that differ from its first declaration"
                    );
                    Layout::Mismatch(vector_names.to_vec())
                }
            }
        };

        Self {
            qualified,
            prefix,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            incarnation,
            layout,
        }
    }

    /// Value tuple in vector order for the caller's `values`.
    pub(crate) fn resolve<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<String>> {
        if values.len() != self.labels.len() {
            return Err(StatsError::label_mismatch(&self.labels, values));
        }

        let mut full: Vec<String> = self.prefix.values().cloned().collect();
        full.extend(values.iter().map(|v| v.as_ref().to_string()));

        if let Some(registry) = &self.incarnation {
            let mut tags = self.prefix.clone();
            for (label, value) in self.labels.iter().zip(values) {
                tags.insert(label.clone(), value.as_ref().to_string());
            }
            let ordinal = registry.ordinal(IncarnationKey::new(self.qualified.clone(), tags));
            full.push(ordinal.to_string());
        }

        match &self.layout {
            Layout::Direct => Ok(full),
            Layout::Reordered(order) => Ok(order.iter().map(|&i| full[i].clone()).collect()),
            Layout::Mismatch(names) => Err(StatsError::label_mismatch(names, &full)),
        }
    }
}

/// A shared vector seen through one declaration site.
pub struct BoundVector<V> {
    vector: Arc<V>,
    binding: Arc<Binding>,
}

impl<V> Clone for BoundVector<V> {
    fn clone(&self) -> Self {
        Self {
            vector: Arc::clone(&self.vector),
            binding: Arc::clone(&self.binding),
        }
    }
}

impl<V: LabeledVector> BoundVector<V> {
    pub(crate) fn new(vector: Arc<V>, binding: Binding) -> Self {
        Self {
            vector,
            binding: Arc::new(binding),
        }
    }

    pub(crate) fn fetch<S: AsRef<str>>(&self, values: &[S]) -> Result<V::Entity> {
        let full = self.binding.resolve(values)?;
        self.vector.entity(&full)
    }

    /// Exported name of the underlying vector.
    pub fn name(&self) -> &str {
        &self.binding.qualified
    }
}
