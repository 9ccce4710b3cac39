#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fmt::Display;
use std::sync::Arc;

use scopestat_scope::{
    Instrument, InstrumentOpts, InstrumentVector, Scope, StaticCollector, Timer, TimerOpts,
    TimerVector,
};

#[test]
fn timer_records_elapsed_seconds() {
    let c = Arc::new(StaticCollector::new());
    let root = Scope::root(c.clone());

    let t = Timer::new(&root, "req", TimerOpts::default());
    t.start().stop();
    t.start().stop();

    let snap = c.snapshot();
    assert_eq!(snap.histograms[0].name, "req_seconds");
    assert_eq!(snap.histograms[0].value.count, 2);
    assert!(snap.histograms[0].value.sum >= 0.0);
}

#[test]
fn timer_suffix_is_configurable() {
    let c = Arc::new(StaticCollector::new());
    let t = Timer::new(
        &Scope::root(c.clone()),
        "req",
        TimerOpts::default().with_suffix("_latency"),
    );
    t.start().stop();

    assert_eq!(c.snapshot().histograms[0].name, "req_latency");
}

#[test]
fn timer_vector_tags_each_timer() {
    let c = Arc::new(StaticCollector::new());
    let root = Scope::root(c.clone()).scope("http", &[]);

    let tv = TimerVector::new(&root, "req", &["route"], TimerOpts::default());
    tv.with_labels(&["/a"]).start().stop();
    tv.with_labels(&["/b"]).start().stop();
    tv.with_labels(&["/a"]).start().stop();

    let snap = c.snapshot();
    let seen: Vec<(&str, &str, i64)> = snap
        .histograms
        .iter()
        .map(|h| {
            (
                h.name.as_str(),
                h.value.tags["route"].as_str(),
                h.value.count,
            )
        })
        .collect();
    assert_eq!(
        seen,
        vec![("http_req_seconds", "/a", 2), ("http_req_seconds", "/b", 1)]
    );
    assert!(tv.try_with_labels(&["/a", "extra"]).is_err());
}

#[test]
fn instrument_counts_outcomes() {
    let c = Arc::new(StaticCollector::new());
    let i = Instrument::new(&Scope::root(c.clone()), "call", InstrumentOpts::default());

    assert_eq!(i.exec(|| Ok::<_, String>(7)), Ok(7));
    assert_eq!(i.exec(|| Err::<i32, _>("boom".to_string())), Err("boom".to_string()));
    i.exec(|| Ok::<_, String>(())).unwrap();

    let snap = c.snapshot();
    let counters: Vec<(&str, Option<&str>, i64)> = snap
        .counters
        .iter()
        .map(|s| {
            (
                s.name.as_str(),
                s.labels.get("status").map(String::as_str),
                s.value,
            )
        })
        .collect();
    assert_eq!(
        counters,
        vec![
            ("call_started_total", None, 3),
            ("call_total", Some("failed"), 1),
            ("call_total", Some("success"), 2),
        ]
    );
    assert_eq!(snap.histograms[0].name, "call_duration_seconds");
    assert_eq!(snap.histograms[0].value.count, 3);
}

#[test]
fn instrument_options_drop_series_and_format_status() {
    let c = Arc::new(StaticCollector::new());
    let opts = InstrumentOpts::default()
        .disable_started_counter()
        .disable_duration_tracking()
        .with_status_label("outcome")
        .with_formatter(|err: Option<&dyn Display>| match err {
            None => "ok".to_string(),
            Some(e) => e.to_string(),
        });
    let i = Instrument::new(&Scope::root(c.clone()), "job", opts);

    i.exec(|| Err::<(), _>("timeout")).unwrap_err();

    let snap = c.snapshot();
    assert!(snap.histograms.is_empty());
    assert_eq!(snap.counters.len(), 1);
    assert_eq!(snap.counters[0].name, "job_total");
    assert_eq!(snap.counters[0].labels["outcome"], "timeout");
}

#[test]
fn instrument_vector_and_noop() {
    let c = Arc::new(StaticCollector::new());
    let iv = InstrumentVector::new(
        &Scope::root(c.clone()),
        "rpc",
        &["method"],
        InstrumentOpts::default(),
    );
    iv.with_labels(&["get"]).exec(|| Ok::<_, String>(())).unwrap();

    let snap = c.snapshot();
    assert!(snap
        .counters
        .iter()
        .all(|s| s.labels.get("method").map(String::as_str) == Some("get")));

    let noop = InstrumentVector::new(&Scope::noop(), "rpc", &["method"], InstrumentOpts::default());
    assert_eq!(noop.with_labels(&["get"]).exec(|| Ok::<_, String>(5)), Ok(5));
}
