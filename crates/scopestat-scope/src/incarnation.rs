//! Incarnation ordinals.
//!
//! A scope wrapped with an [`IncarnationRegistry`] appends one hidden label to
//! every metric it declares. The label value is the ordinal of the series'
//! [`IncarnationKey`]: the first key a registry sees gets `0`, every new key
//! gets the next integer, and a key seen before gets its old ordinal back.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use scopestat_core::Tags;

/// Label key used when none is configured.
pub const DEFAULT_INCARNATION_KEY: &str = "incarnation";

/// Identity of a declaration site: qualified metric name plus every tag and
/// label value bound at that site.
///
/// The name is the already joined namespace path, so `scope("foo").gauge("bar")`
/// and `gauge("foo_bar")` share a key; tags are ordered, so declaration order
/// does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncarnationKey {
    pub path: String,
    pub tags: Tags,
}

impl IncarnationKey {
    pub fn new(path: impl Into<String>, tags: Tags) -> Self {
        Self {
            path: path.into(),
            tags,
        }
    }
}

#[derive(Default)]
struct OrdinalTable {
    next: u64,
    assigned: HashMap<IncarnationKey, u64>,
}

/// Assigns ordinals to incarnation keys.
pub struct IncarnationRegistry {
    key: String,
    table: Mutex<OrdinalTable>,
}

static GLOBAL: OnceLock<Arc<IncarnationRegistry>> = OnceLock::new();

impl IncarnationRegistry {
    /// Registry appending its ordinal under label `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            table: Mutex::new(OrdinalTable::default()),
        }
    }

    /// Process-wide registry keyed `"incarnation"`.
    ///
    /// A convenience default only; pass an explicit registry wherever the
    /// sequence must not be shared with unrelated code.
    pub fn global() -> Arc<IncarnationRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(IncarnationRegistry::new(DEFAULT_INCARNATION_KEY))))
    }

    /// Label name carrying the ordinal.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ordinal of `key`, assigning the next one on first sight.
    pub fn ordinal(&self, key: IncarnationKey) -> u64 {
        let mut table = self.table.lock();
        if let Some(&ordinal) = table.assigned.get(&key) {
            return ordinal;
        }

        let ordinal = table.next;
        table.next += 1;
        tracing::debug!(label = %self.key, path = %key.path, tags = ?key.tags, ordinal, "new incarnation");
        table.assigned.insert(key, ordinal);
        ordinal
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.table.lock().assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
