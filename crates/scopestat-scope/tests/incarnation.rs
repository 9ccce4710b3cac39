#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use scopestat_core::{StatsError, Tags};
use scopestat_scope::{
    IncarnationKey, IncarnationRegistry, Scope, StaticCollector, DEFAULT_INCARNATION_KEY,
};

fn key(path: &str, pairs: &[(&str, &str)]) -> IncarnationKey {
    let tags: Tags = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    IncarnationKey::new(path, tags)
}

#[test]
fn ordinals_are_assigned_once_per_key() {
    let r = IncarnationRegistry::new("inc");
    assert_eq!(r.ordinal(key("foo_bar", &[("a", "1")])), 0);
    assert_eq!(r.ordinal(key("foo_bar", &[("a", "2")])), 1);
    assert_eq!(r.ordinal(key("foo_bar", &[("a", "1")])), 0);
    assert_eq!(r.len(), 2);
}

#[test]
fn scopes_get_incarnation_labels() {
    let c = Arc::new(StaticCollector::new());
    let root = Scope::root(c.clone()).local_incarnations("incarnation");

    root.scope("svc", &[("shard", "a")]).counter("hits").inc();
    root.scope("svc", &[("shard", "b")]).counter("hits").inc();
    root.scope("svc", &[("shard", "a")]).counter("hits").inc();

    let snap = c.snapshot();
    let seen: Vec<(String, String, i64)> = snap
        .counters
        .iter()
        .map(|s| (s.labels["shard"].clone(), s.labels["incarnation"].clone(), s.value))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), "0".to_string(), 2),
            ("b".to_string(), "1".to_string(), 1),
        ]
    );
}

#[test]
fn nested_namespace_matches_joined_name() {
    let c = Arc::new(StaticCollector::new());
    let registry = Arc::new(IncarnationRegistry::new("inc"));
    let root = Scope::root(c.clone()).with_incarnations(Arc::clone(&registry));

    root.scope("foo", &[]).gauge("bar").update(1);
    root.gauge("foo_bar").update(2);

    assert_eq!(registry.len(), 1);
    let snap = c.snapshot();
    assert_eq!(snap.gauges.len(), 1);
    assert_eq!(snap.gauges[0].labels["inc"], "0");
    assert_eq!(snap.gauges[0].value, 2);
}

#[test]
fn tag_order_does_not_matter() {
    let registry = Arc::new(IncarnationRegistry::new("inc"));
    let root = Scope::root(Arc::new(StaticCollector::new())).with_incarnations(Arc::clone(&registry));

    root.scope("s", &[("a", "1"), ("b", "2")]).counter("c").inc();
    root.scope("s", &[("b", "2"), ("a", "1")]).counter("c").inc();

    assert_eq!(registry.len(), 1);
}

#[test]
fn vector_label_values_are_part_of_the_key() {
    let c = Arc::new(StaticCollector::new());
    let root = Scope::root(c.clone()).local_incarnations("inc");
    let v = root.counter_vector("req", &["code"]);

    v.with_labels(&["200"]).inc();
    v.with_labels(&["500"]).inc();

    let snap = c.snapshot();
    let incs: Vec<&str> = snap.counters.iter().map(|s| s.labels["inc"].as_str()).collect();
    assert_eq!(incs, vec!["0", "1"]);
}

#[test]
fn incarnation_key_is_reserved() {
    let root = Scope::root(Arc::new(StaticCollector::new())).local_incarnations("inc");

    assert_eq!(
        root.try_counter_vector("x", &["inc"]).err(),
        Some(StatsError::ReservedLabel("inc".into()))
    );
    assert!(matches!(
        root.try_scope("s", &[("inc", "1")]),
        Err(StatsError::ReservedLabel(_))
    ));
}

#[test]
fn wrapper_survives_root_scope() {
    let root = Scope::root(Arc::new(StaticCollector::new())).global_incarnations();
    let child = root.scope("a", &[("k", "v")]);

    let back = child.root_scope();
    assert_eq!(back.namespace(), "");
    assert_eq!(
        back.incarnations().map(|r| r.key().to_string()),
        Some(DEFAULT_INCARNATION_KEY.to_string())
    );
    assert!(Arc::ptr_eq(
        back.incarnations().unwrap(),
        &IncarnationRegistry::global()
    ));
}
