//! Hierarchical metric scopes.
//!
//! A scope is an immutable chain of `(namespace segment, tags)` nodes. Metric
//! names are qualified by joining the non-empty segments from the root with
//! `_`; tags are merged from the root down, so a closer scope overrides an
//! ancestor's tag of the same name. Declared metrics resolve to one shared
//! vector per qualified name; the scope's tags become a fixed label prefix.

use std::sync::Arc;

use scopestat_core::{
    Collector, Counter, Cutoffs, Gauge, Histogram, Int64Vector, LabeledVector, MetricKind,
    Result, StatsError, Tags,
};

use crate::binding::{Binding, BoundVector};
use crate::fail::fail_fast;
use crate::incarnation::IncarnationRegistry;
use crate::registry::VectorRegistry;
use crate::vector::{CounterVec, GaugeVec, HistogramVec};

const SEPARATOR: &str = "_";

/// Histogram declaration options.
#[derive(Debug, Clone, Default)]
pub struct HistogramOpts {
    cutoffs: Option<Cutoffs>,
}

impl HistogramOpts {
    /// Use `cutoffs` instead of the root's default.
    pub fn buckets(cutoffs: Cutoffs) -> Self {
        Self {
            cutoffs: Some(cutoffs),
        }
    }
}

struct Node {
    segment: String,
    tags: Tags,
    parent: Option<Arc<Node>>,
}

struct Root {
    vectors: VectorRegistry,
    default_cutoffs: Cutoffs,
}

#[derive(Clone)]
enum Sink {
    Live(Arc<Root>),
    Discard,
}

/// Namespace + tag context for declaring metrics.
#[derive(Clone)]
pub struct Scope {
    node: Arc<Node>,
    sink: Sink,
    incarnation: Option<Arc<IncarnationRegistry>>,
}

impl Scope {
    /// Root scope registering into `collector`.
    pub fn root(collector: Arc<dyn Collector>) -> Self {
        Self::root_with_cutoffs(collector, Cutoffs::default())
    }

    /// Root scope whose histograms default to `cutoffs`.
    pub fn root_with_cutoffs(collector: Arc<dyn Collector>, cutoffs: Cutoffs) -> Self {
        Self {
            node: Arc::new(Node {
                segment: String::new(),
                tags: Tags::new(),
                parent: None,
            }),
            sink: Sink::Live(Arc::new(Root {
                vectors: VectorRegistry::new(collector),
                default_cutoffs: cutoffs,
            })),
            incarnation: None,
        }
    }

    /// Scope whose metrics discard every operation.
    pub fn noop() -> Self {
        Self {
            node: Arc::new(Node {
                segment: String::new(),
                tags: Tags::new(),
                parent: None,
            }),
            sink: Sink::Discard,
            incarnation: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.sink, Sink::Discard)
    }

    /// Joined namespace of this scope.
    pub fn namespace(&self) -> String {
        let mut segments = Vec::new();
        let mut node = Some(&self.node);
        while let Some(n) = node {
            if !n.segment.is_empty() {
                segments.push(n.segment.as_str());
            }
            node = n.parent.as_ref();
        }
        segments.reverse();
        segments.join(SEPARATOR)
    }

    /// Merged tags of this scope.
    pub fn tags(&self) -> Tags {
        let mut chain = Vec::new();
        let mut node = Some(&self.node);
        while let Some(n) = node {
            chain.push(n);
            node = n.parent.as_ref();
        }

        let mut tags = Tags::new();
        for n in chain.into_iter().rev() {
            for (k, v) in &n.tags {
                tags.insert(k.clone(), v.clone());
            }
        }
        tags
    }

    /// Incarnation registry wrapping this scope, if any.
    pub fn incarnations(&self) -> Option<&Arc<IncarnationRegistry>> {
        self.incarnation.as_ref()
    }

    /// Child scope. Empty `namespace` keeps the parent's namespace.
    #[track_caller]
    pub fn scope(&self, namespace: &str, tags: &[(&str, &str)]) -> Scope {
        fail_fast(self.try_scope(namespace, tags))
    }

    pub fn try_scope(&self, namespace: &str, tags: &[(&str, &str)]) -> Result<Scope> {
        let tags: Tags = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.child(namespace, tags)
    }

    pub(crate) fn child(&self, namespace: &str, tags: Tags) -> Result<Scope> {
        if let Some(r) = &self.incarnation {
            if tags.contains_key(r.key()) {
                return Err(StatsError::ReservedLabel(r.key().to_string()));
            }
        }

        Ok(Scope {
            node: Arc::new(Node {
                segment: namespace.to_string(),
                tags,
                parent: Some(Arc::clone(&self.node)),
            }),
            sink: self.sink.clone(),
            incarnation: self.incarnation.clone(),
        })
    }

    /// Namespace-less, tag-less ancestor, keeping the incarnation wrapper.
    pub fn root_scope(&self) -> Scope {
        let mut node = &self.node;
        while let Some(parent) = &node.parent {
            node = parent;
        }

        Scope {
            node: Arc::clone(node),
            sink: self.sink.clone(),
            incarnation: self.incarnation.clone(),
        }
    }

    /// Same scope, with every metric carrying an incarnation label from
    /// `registry`.
    pub fn with_incarnations(&self, registry: Arc<IncarnationRegistry>) -> Scope {
        Scope {
            node: Arc::clone(&self.node),
            sink: self.sink.clone(),
            incarnation: Some(registry),
        }
    }

    /// Wrap with the process-wide registry.
    pub fn global_incarnations(&self) -> Scope {
        self.with_incarnations(IncarnationRegistry::global())
    }

    /// Wrap with a fresh registry labelled `key`.
    pub fn local_incarnations(&self, key: &str) -> Scope {
        self.with_incarnations(Arc::new(IncarnationRegistry::new(key)))
    }

    fn qualify(&self, name: &str) -> String {
        let ns = self.namespace();
        match (ns.is_empty(), name.is_empty()) {
            (true, _) => name.to_string(),
            (false, true) => ns,
            (false, false) => format!("{ns}{SEPARATOR}{name}"),
        }
    }

    #[track_caller]
    pub fn counter(&self, name: &str) -> Counter {
        self.counter_vector(name, &[]).unlabeled()
    }

    #[track_caller]
    pub fn counter_vector(&self, name: &str, labels: &[&str]) -> CounterVec {
        fail_fast(self.try_counter_vector(name, labels))
    }

    pub fn try_counter_vector(&self, name: &str, labels: &[&str]) -> Result<CounterVec> {
        match &self.sink {
            Sink::Live(root) => self
                .bind_int64(root, MetricKind::Counter, name, labels)
                .map(CounterVec::Live),
            Sink::Discard => Ok(CounterVec::Discard),
        }
    }

    #[track_caller]
    pub fn gauge(&self, name: &str) -> Gauge {
        self.gauge_vector(name, &[]).unlabeled()
    }

    #[track_caller]
    pub fn gauge_vector(&self, name: &str, labels: &[&str]) -> GaugeVec {
        fail_fast(self.try_gauge_vector(name, labels))
    }

    pub fn try_gauge_vector(&self, name: &str, labels: &[&str]) -> Result<GaugeVec> {
        match &self.sink {
            Sink::Live(root) => self
                .bind_int64(root, MetricKind::Gauge, name, labels)
                .map(GaugeVec::Live),
            Sink::Discard => Ok(GaugeVec::Discard),
        }
    }

    #[track_caller]
    pub fn histogram(&self, name: &str, opts: HistogramOpts) -> Histogram {
        self.histogram_vector(name, &[], opts).unlabeled()
    }

    #[track_caller]
    pub fn histogram_vector(&self, name: &str, labels: &[&str], opts: HistogramOpts) -> HistogramVec {
        fail_fast(self.try_histogram_vector(name, labels, opts))
    }

    pub fn try_histogram_vector(
        &self,
        name: &str,
        labels: &[&str],
        opts: HistogramOpts,
    ) -> Result<HistogramVec> {
        let Sink::Live(root) = &self.sink else {
            return Ok(HistogramVec::Discard);
        };

        let cutoffs = opts.cutoffs.unwrap_or_else(|| root.default_cutoffs.clone());
        let qualified = self.qualify(name);
        let prefix = self.tags();
        let names = Binding::site_names(&prefix, labels, self.incarnation.as_deref())?;

        let vector = root.vectors.histogram(&qualified, names.clone(), &cutoffs)?;
        let binding = Binding::new(
            qualified,
            prefix,
            labels,
            self.incarnation.clone(),
            &names,
            vector.labels(),
        );
        Ok(HistogramVec::Live(BoundVector::new(vector, binding)))
    }

    fn bind_int64(
        &self,
        root: &Root,
        kind: MetricKind,
        name: &str,
        labels: &[&str],
    ) -> Result<BoundVector<Int64Vector>> {
        let qualified = self.qualify(name);
        let prefix = self.tags();
        let names = Binding::site_names(&prefix, labels, self.incarnation.as_deref())?;

        let vector = root.vectors.int64(kind, &qualified, names.clone())?;
        let binding = Binding::new(
            qualified,
            prefix,
            labels,
            self.incarnation.clone(),
            &names,
            vector.labels(),
        );
        Ok(BoundVector::new(vector, binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_skips_empty_segments() {
        let s = Scope::noop().scope("a", &[]).scope("", &[]).scope("b", &[]);
        assert_eq!(s.namespace(), "a_b");
        assert_eq!(s.qualify("c"), "a_b_c");
        assert_eq!(Scope::noop().qualify("c"), "c");
    }

    #[test]
    fn closer_tags_override() {
        let s = Scope::noop()
            .scope("a", &[("env", "prod"), ("zone", "eu")])
            .scope("b", &[("env", "dev")]);
        let tags = s.tags();
        assert_eq!(tags["env"], "dev");
        assert_eq!(tags["zone"], "eu");
    }

    #[test]
    fn root_scope_drops_namespace_and_tags() {
        let s = Scope::noop().scope("a", &[("k", "v")]).local_incarnations("inc");
        let root = s.root_scope();
        assert_eq!(root.namespace(), "");
        assert!(root.tags().is_empty());
        assert_eq!(root.incarnations().map(|r| r.key()), Some("inc"));
    }

    #[test]
    fn reserved_tag_is_rejected() {
        let s = Scope::noop().local_incarnations("inc");
        assert_eq!(
            s.try_scope("a", &[("inc", "1")]).err(),
            Some(StatsError::ReservedLabel("inc".into()))
        );
    }
}
