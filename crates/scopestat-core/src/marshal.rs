//! Label tuple marshaling.
//!
//! A tuple of label values is folded into a 64-bit FNV-1a key. Every value is
//! followed by a boundary marker that no byte can produce, so `["ab", "c"]` and
//! `["a", "bc"]` hash differently. The original tuple is kept in a side table
//! keyed by `(key, len)` for exact reverse lookup.
//!
//! Distinct tuples never share a key: when the hashed slot is already taken by
//! another tuple, the marshaler probes the following keys until it finds the
//! tuple or a free slot. Entries are never removed, so probing is deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// One past the last Unicode scalar value; never produced by a single byte.
const VALUE_BOUNDARY: u64 = 0x11_0000;

/// Key of the empty tuple.
pub const EMPTY_KEY: u64 = FNV_OFFSET;

/// Start a new FNV-1a 64 accumulator.
pub fn hash_new() -> u64 {
    FNV_OFFSET
}

/// Fold one value plus its boundary marker into the accumulator.
pub fn hash_add(mut h: u64, s: &str) -> u64 {
    for b in s.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h ^= VALUE_BOUNDARY;
    h.wrapping_mul(FNV_PRIME)
}

/// Hash a whole tuple.
pub fn hash_values<S: AsRef<str>>(values: &[S]) -> u64 {
    values.iter().fold(hash_new(), |h, v| hash_add(h, v.as_ref()))
}

/// Reversible label tuple ⇄ key mapping.
#[derive(Default)]
pub struct LabelMarshaler {
    table: RwLock<HashMap<(u64, usize), Arc<[String]>>>,
}

impl LabelMarshaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a tuple to its stable key, recording it on first sight.
    pub fn marshal<S: AsRef<str>>(&self, values: &[S]) -> u64 {
        if values.is_empty() {
            return EMPTY_KEY;
        }

        let start = hash_values(values);

        {
            let table = self.table.read();
            if let Probe::Found(key) = probe(&table, start, values) {
                return key;
            }
        }

        let mut table = self.table.write();
        match probe(&table, start, values) {
            Probe::Found(key) => key,
            Probe::Vacant(key) => {
                if key != start {
                    tracing::warn!(
                        hash = start,
                        key,
                        values = ?values.iter().map(|v| v.as_ref()).collect::<Vec<&str>>(),
                        "label hash collision, probed to a free key"
                    );
                }
                let tuple: Arc<[String]> =
                    values.iter().map(|v| v.as_ref().to_string()).collect();
                table.insert((key, values.len()), tuple);
                key
            }
        }
    }

    /// Recover the tuple recorded under `key`, if any.
    pub fn unmarshal(&self, key: u64, len: usize) -> Option<Arc<[String]>> {
        if len == 0 {
            return (key == EMPTY_KEY).then(|| Arc::from(Vec::<String>::new()));
        }
        self.table.read().get(&(key, len)).cloned()
    }

    /// Number of distinct non-empty tuples recorded.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

enum Probe {
    Found(u64),
    Vacant(u64),
}

fn probe<S: AsRef<str>>(
    table: &HashMap<(u64, usize), Arc<[String]>>,
    start: u64,
    values: &[S],
) -> Probe {
    let mut key = start;
    loop {
        match table.get(&(key, values.len())) {
            None => return Probe::Vacant(key),
            Some(t) if same_tuple(t, values) => return Probe::Found(key),
            Some(_) => key = key.wrapping_add(1),
        }
    }
}

fn same_tuple<S: AsRef<str>>(stored: &[String], values: &[S]) -> bool {
    stored.len() == values.len() && stored.iter().zip(values).all(|(a, b)| a == b.as_ref())
}
