//! Call instrumentation.
//!
//! An [`Instrument`] wraps a fallible call and records:
//! - `<name>_started_total`: calls started (optional),
//! - `<name>_total{status}`: calls finished, by status,
//! - `<name>_duration_seconds`: call duration (optional).
//!
//! `started_total - sum(total)` is the number of calls in flight.

use std::fmt::{self, Display};
use std::sync::Arc;

use scopestat_core::{Counter, EntityVector, Result};

use crate::fail::fail_fast;
use crate::scope::Scope;
use crate::timer::{Timer, TimerOpts};
use crate::vector::CounterVec;

const DEFAULT_STATUS_LABEL: &str = "status";

/// Maps a call outcome (`None` on success, the error otherwise) to a status
/// label value.
pub type StatusFormatter = Arc<dyn Fn(Option<&dyn Display>) -> String + Send + Sync>;

fn default_status(err: Option<&dyn Display>) -> String {
    match err {
        None => "success".into(),
        Some(_) => "failed".into(),
    }
}

#[derive(Clone)]
pub struct InstrumentOpts {
    pub track_started: bool,
    pub track_duration: bool,
    pub status_label: String,
    pub formatter: StatusFormatter,
    pub timer: TimerOpts,
}

impl Default for InstrumentOpts {
    fn default() -> Self {
        Self {
            track_started: true,
            track_duration: true,
            status_label: DEFAULT_STATUS_LABEL.to_string(),
            formatter: Arc::new(default_status),
            timer: TimerOpts::default(),
        }
    }
}

impl fmt::Debug for InstrumentOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentOpts")
            .field("track_started", &self.track_started)
            .field("track_duration", &self.track_duration)
            .field("status_label", &self.status_label)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl InstrumentOpts {
    pub fn disable_started_counter(mut self) -> Self {
        self.track_started = false;
        self
    }

    pub fn disable_duration_tracking(mut self) -> Self {
        self.track_duration = false;
        self
    }

    pub fn with_status_label(mut self, label: &str) -> Self {
        self.status_label = label.to_string();
        self
    }

    pub fn with_formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&dyn Display>) -> String + Send + Sync + 'static,
    {
        self.formatter = Arc::new(f);
        self
    }

    pub fn with_timer(mut self, timer: TimerOpts) -> Self {
        self.timer = timer;
        self
    }
}

#[derive(Clone)]
pub struct Instrument {
    started: Counter,
    finished: CounterVec,
    timer: Option<Timer>,
    formatter: StatusFormatter,
}

impl Instrument {
    #[track_caller]
    pub fn new(scope: &Scope, name: &str, opts: InstrumentOpts) -> Self {
        fail_fast(Self::try_new(scope, name, opts))
    }

    pub fn try_new(scope: &Scope, name: &str, opts: InstrumentOpts) -> Result<Self> {
        let started = if opts.track_started {
            scope
                .try_counter_vector(&format!("{name}_started_total"), &[])?
                .try_unlabeled()?
        } else {
            Counter::Discard
        };

        let timer = if opts.track_duration {
            Some(Timer::try_new(scope, &format!("{name}_duration"), opts.timer)?)
        } else {
            None
        };

        let finished =
            scope.try_counter_vector(&format!("{name}_total"), &[opts.status_label.as_str()])?;

        Ok(Self {
            started,
            finished,
            timer,
            formatter: opts.formatter,
        })
    }

    /// Run `f`, recording start, duration and outcome. The result is returned
    /// unchanged.
    pub fn exec<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        E: Display,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        self.started.inc();
        let watch = self.timer.as_ref().map(Timer::start);

        let res = f();

        if let Some(w) = watch {
            w.stop();
        }
        let status = match &res {
            Ok(_) => (self.formatter)(None),
            Err(e) => (self.formatter)(Some(e as &dyn Display)),
        };
        self.finished.with_labels(&[status]).inc();

        res
    }
}

/// Instruments keyed by label values.
pub enum InstrumentVector {
    Live(Arc<EntityVector<Instrument>>),
    Discard,
}

impl InstrumentVector {
    pub fn new(scope: &Scope, name: &str, labels: &[&str], opts: InstrumentOpts) -> Self {
        if scope.is_noop() {
            return InstrumentVector::Discard;
        }

        let scope = scope.clone();
        let name = name.to_string();
        let labels = labels.iter().map(|l| l.to_string()).collect();
        InstrumentVector::Live(Arc::new(EntityVector::new(labels, move |tags| {
            Instrument::try_new(&scope.child("", tags.clone())?, &name, opts.clone())
        })))
    }

    pub fn try_with_labels<S: AsRef<str>>(&self, values: &[S]) -> Result<Instrument> {
        match self {
            InstrumentVector::Live(v) => v.entity(values).map(|i| Instrument::clone(&i)),
            InstrumentVector::Discard => Ok(Instrument {
                started: Counter::Discard,
                finished: CounterVec::Discard,
                timer: None,
                formatter: Arc::new(default_status),
            }),
        }
    }

    #[track_caller]
    pub fn with_labels<S: AsRef<str>>(&self, values: &[S]) -> Instrument {
        fail_fast(self.try_with_labels(values))
    }
}

impl Clone for InstrumentVector {
    fn clone(&self) -> Self {
        match self {
            InstrumentVector::Live(v) => InstrumentVector::Live(Arc::clone(v)),
            InstrumentVector::Discard => InstrumentVector::Discard,
        }
    }
}
