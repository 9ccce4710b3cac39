//! Shared error type across scopestat crates.

use std::fmt;

use thiserror::Error;

/// Failure classes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller misuse at a fetch or declaration site.
    ProgrammerError,
    /// Two registrations of one exported name disagree, or the config is invalid.
    ConfigurationConflict,
    /// Internal error.
    Internal,
}

impl ErrorClass {
    /// String representation used in logs and panic messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::ProgrammerError => "PROGRAMMER_ERROR",
            ErrorClass::ConfigurationConflict => "CONFIGURATION_CONFLICT",
            ErrorClass::Internal => "INTERNAL",
        }
    }
}

/// Metric family kind as seen by a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Unified error type used by core and scope.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("not the correct number of labels: labels: {labels:?}, values: {values:?}")]
    LabelMismatch {
        labels: Vec<String>,
        values: Vec<String>,
    },
    #[error("label {0:?} is reserved for incarnations")]
    ReservedLabel(String),
    #[error("label {0:?} is declared more than once")]
    DuplicateLabel(String),
    #[error("invalid histogram cutoffs {0:?}: must be strictly ascending and not NaN")]
    InvalidCutoffs(Vec<f64>),
    #[error("{name}: cannot be registered because the labels are different, has: {has:?}, want: {want:?}")]
    LabelConflict {
        name: String,
        has: Vec<String>,
        want: Vec<String>,
    },
    #[error("{name}: histogram cannot be registered because the cutoffs are different, has: {has:?}, want: {want:?}")]
    CutoffConflict {
        name: String,
        has: Vec<f64>,
        want: Vec<f64>,
    },
    #[error("{name}: registered as a {has} but already registered as a {want}")]
    KindConflict {
        name: String,
        has: MetricKind,
        want: MetricKind,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StatsError {
    /// Map an error to its failure class.
    pub fn class(&self) -> ErrorClass {
        match self {
            StatsError::LabelMismatch { .. }
            | StatsError::ReservedLabel(_)
            | StatsError::DuplicateLabel(_)
            | StatsError::InvalidCutoffs(_) => ErrorClass::ProgrammerError,
            StatsError::LabelConflict { .. }
            | StatsError::CutoffConflict { .. }
            | StatsError::KindConflict { .. }
            | StatsError::Config(_) => ErrorClass::ConfigurationConflict,
            StatsError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Build a `LabelMismatch` from declared names and supplied values.
    pub fn label_mismatch<S: AsRef<str>>(labels: &[String], values: &[S]) -> Self {
        StatsError::LabelMismatch {
            labels: labels.to_vec(),
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }
}
