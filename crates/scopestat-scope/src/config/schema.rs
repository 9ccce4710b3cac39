use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use scopestat_core::{Collector, Cutoffs, Result, StatsError};

use crate::incarnation::{IncarnationRegistry, DEFAULT_INCARNATION_KEY};
use crate::scope::Scope;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsConfig {
    pub version: u32,

    #[serde(default)]
    pub stats: StatsSection,
}

impl StatsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StatsError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.stats.validate()
    }

    /// Root scope described by this config, registering into `collector`.
    ///
    /// A disabled config yields a discarding scope and never touches
    /// `collector`.
    pub fn build_root(&self, collector: Arc<dyn Collector>) -> Result<Scope> {
        let s = &self.stats;
        if !s.enabled {
            return Ok(Scope::noop());
        }

        let cutoffs = s.histogram.cutoffs()?;
        let mut root = Scope::root_with_cutoffs(collector, cutoffs);
        root = match s.incarnation.mode {
            IncarnationMode::None => root,
            IncarnationMode::Global => root.global_incarnations(),
            IncarnationMode::Local => {
                root.with_incarnations(Arc::new(IncarnationRegistry::new(s.incarnation.key.clone())))
            }
        };

        if s.namespace.is_empty() && s.tags.is_empty() {
            return Ok(root);
        }
        let tags: Vec<(&str, &str)> = s
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        root.try_scope(&s.namespace, &tags)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub histogram: HistogramSection,

    #[serde(default)]
    pub incarnation: IncarnationSection,
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            namespace: String::new(),
            tags: BTreeMap::new(),
            histogram: HistogramSection::default(),
            incarnation: IncarnationSection::default(),
        }
    }
}

impl StatsSection {
    pub fn validate(&self) -> Result<()> {
        if self.tags.keys().any(|k| k.is_empty()) {
            return Err(StatsError::Config("stats.tags keys must not be empty".into()));
        }

        self.histogram.cutoffs()?;
        self.incarnation.validate()?;

        if self.incarnation.mode != IncarnationMode::None
            && self.tags.contains_key(&self.incarnation.key)
        {
            return Err(StatsError::Config(format!(
                "stats.tags must not use the incarnation key {:?}",
                self.incarnation.key
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistogramSection {
    /// Default cutoffs for histograms; `+inf` is appended.
    #[serde(default)]
    pub buckets: Option<Vec<f64>>,
}

impl HistogramSection {
    pub fn cutoffs(&self) -> Result<Cutoffs> {
        match &self.buckets {
            None => Ok(Cutoffs::default()),
            Some(b) => Cutoffs::custom(b)
                .map_err(|e| StatsError::Config(format!("stats.histogram.buckets: {e}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncarnationMode {
    #[default]
    None,
    Global,
    Local,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncarnationSection {
    #[serde(default)]
    pub mode: IncarnationMode,

    #[serde(default = "default_incarnation_key")]
    pub key: String,
}

impl Default for IncarnationSection {
    fn default() -> Self {
        Self {
            mode: IncarnationMode::default(),
            key: default_incarnation_key(),
        }
    }
}

impl IncarnationSection {
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(StatsError::Config("stats.incarnation.key must not be empty".into()));
        }
        // The process-wide registry has a fixed key.
        if self.mode == IncarnationMode::Global && self.key != DEFAULT_INCARNATION_KEY {
            return Err(StatsError::Config(format!(
                "stats.incarnation.key must be {DEFAULT_INCARNATION_KEY:?} in global mode"
            )));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_incarnation_key() -> String {
    DEFAULT_INCARNATION_KEY.into()
}
