//! Label marshaler reversibility.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use scopestat_core::marshal::{LabelMarshaler, EMPTY_KEY};

#[test]
fn unmarshal_inverts_marshal() {
    let m = LabelMarshaler::new();
    let tuples: Vec<Vec<&str>> = vec![
        vec![],
        vec![""],
        vec!["", ""],
        vec!["ab", "c"],
        vec!["a", "bc"],
        vec!["GET", "/v1/users", "200"],
        vec!["ünïcode", "🚀", "\u{10FFFF}"],
        vec!["same", "same", "same"],
    ];

    let keys: Vec<u64> = tuples.iter().map(|t| m.marshal(t)).collect();

    for (t, key) in tuples.iter().zip(&keys) {
        let back = m.unmarshal(*key, t.len()).expect("tuple recorded");
        assert_eq!(&*back, t.as_slice(), "tuple={t:?}");
    }

    assert_eq!(keys[0], EMPTY_KEY);
    assert_ne!(keys[3], keys[4]);
    assert_ne!(keys[1], keys[2]);
}

#[test]
fn marshal_is_stable_across_calls() {
    let m = LabelMarshaler::new();
    let first = m.marshal(&["x", "y"]);
    let owned = vec!["x".to_string(), "y".to_string()];
    assert_eq!(m.marshal(&owned), first);
    assert_eq!(m.len(), 1);
}

#[test]
fn unknown_key_is_none() {
    let m = LabelMarshaler::new();
    let key = m.marshal(&["x"]);
    assert!(m.unmarshal(key, 2).is_none());
    assert!(m.unmarshal(key.wrapping_add(7), 1).is_none());
    assert!(m.unmarshal(key, 0).is_none());
}
