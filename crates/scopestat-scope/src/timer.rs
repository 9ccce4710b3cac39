//! Duration histograms.

use std::sync::Arc;
use std::time::Instant;

use scopestat_core::{EntityVector, Histogram, Result};

use crate::fail::fail_fast;
use crate::scope::{HistogramOpts, Scope};

const DEFAULT_SUFFIX: &str = "_seconds";

/// Timer declaration options.
#[derive(Debug, Clone)]
pub struct TimerOpts {
    pub histogram: HistogramOpts,
    /// Appended to the timer name; `_seconds` by default.
    pub suffix: String,
}

impl Default for TimerOpts {
    fn default() -> Self {
        Self {
            histogram: HistogramOpts::default(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl TimerOpts {
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn with_histogram(mut self, histogram: HistogramOpts) -> Self {
        self.histogram = histogram;
        self
    }
}

/// Histogram of elapsed seconds.
#[derive(Debug, Clone)]
pub struct Timer {
    histogram: Histogram,
}

impl Timer {
    #[track_caller]
    pub fn new(scope: &Scope, name: &str, opts: TimerOpts) -> Self {
        fail_fast(Self::try_new(scope, name, opts))
    }

    pub fn try_new(scope: &Scope, name: &str, opts: TimerOpts) -> Result<Self> {
        let name = format!("{name}{}", opts.suffix);
        let histogram = scope
            .try_histogram_vector(&name, &[], opts.histogram)?
            .try_unlabeled()?;
        Ok(Self { histogram })
    }

    pub fn start(&self) -> StopWatch {
        StopWatch {
            t0: Instant::now(),
            histogram: self.histogram.clone(),
        }
    }

    /// Underlying histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

/// One running measurement.
#[must_use = "a stop watch records nothing until stopped"]
pub struct StopWatch {
    t0: Instant,
    histogram: Histogram,
}

impl StopWatch {
    /// Record the seconds elapsed since [`Timer::start`].
    pub fn stop(self) {
        self.histogram.record(self.t0.elapsed().as_secs_f64());
    }
}

/// Timers keyed by label values. Each label set gets its own timer declared
/// through a child scope tagged with those values.
pub enum TimerVector {
    Live(Arc<EntityVector<Timer>>),
    Discard,
}

impl TimerVector {
    pub fn new(scope: &Scope, name: &str, labels: &[&str], opts: TimerOpts) -> Self {
        if scope.is_noop() {
            return TimerVector::Discard;
        }

        let scope = scope.clone();
        let name = name.to_string();
        let labels = labels.iter().map(|l| l.to_string()).collect();
        TimerVector::Live(Arc::new(EntityVector::new(labels, move |tags| {
            Timer::try_new(&scope.child("", tags.clone())?, &name, opts.clone())
        })))
    }

    pub fn try_with_labels<S: AsRef<str>>(&self, values: &[S]) -> Result<Timer> {
        match self {
            TimerVector::Live(v) => v.entity(values).map(|t| Timer::clone(&t)),
            TimerVector::Discard => Ok(Timer {
                histogram: Histogram::Discard,
            }),
        }
    }

    #[track_caller]
    pub fn with_labels<S: AsRef<str>>(&self, values: &[S]) -> Timer {
        fail_fast(self.try_with_labels(values))
    }
}

impl Clone for TimerVector {
    fn clone(&self) -> Self {
        match self {
            TimerVector::Live(v) => TimerVector::Live(Arc::clone(v)),
            TimerVector::Discard => TimerVector::Discard,
        }
    }
}
