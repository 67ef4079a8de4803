//! Property-based tests for intent decoding and version resolution.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use proptest::prelude::*;
use serde_json::{Value, json};
use setlive::domain::intent::{DeployConfig, IntentApp, string_map};

/// Any JSON value that is NOT a flat string → string object.
fn non_string_map() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    let non_string_scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        prop::collection::vec("[a-z]{1,4}".prop_map(Value::String), 0..3).prop_map(Value::Array),
    ];
    prop_oneof![
        scalar,
        prop::collection::vec("[a-z]{1,4}".prop_map(Value::String), 0..4).prop_map(Value::Array),
        (
            prop::collection::btree_map("[a-z]{1,6}", "[a-z]{0,6}", 0..4),
            "[A-Z]{1,6}",
            non_string_scalar,
        )
            .prop_map(|(strings, bad_key, bad_value)| {
                let mut map: serde_json::Map<String, Value> =
                    strings.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
                map.insert(bad_key, bad_value);
                Value::Object(map)
            }),
    ]
}

fn status() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("active".to_string()),
        Just("inactive".to_string()),
        Just("prepared".to_string()),
    ]
}

fn app_with(versions: BTreeMap<String, String>) -> IntentApp {
    IntentApp {
        name: "web".to_string(),
        basedir: PathBuf::from("/srv/web"),
        versions,
    }
}

proptest! {
    /// Anything that is not a flat string map is rejected.
    #[test]
    fn prop_non_string_maps_rejected(raw in non_string_map()) {
        prop_assert!(string_map("k", &raw).is_err(), "accepted {raw}");
    }

    /// Flat string maps are accepted unchanged.
    #[test]
    fn prop_string_maps_round_trip(fields in prop::collection::btree_map("[a-z]{1,8}", ".{0,12}", 0..8)) {
        let raw = json!(fields);
        prop_assert_eq!(string_map("k", &raw).expect("valid"), fields);
    }

    /// Relative basedirs never decode.
    #[test]
    fn prop_relative_basedir_rejected(dir in "[a-z][a-z0-9_/]{0,20}") {
        let raw = json!({"basedir": dir});
        prop_assert!(DeployConfig::decode("k", &raw).is_err());
    }

    /// Exactly one active version is always the one returned.
    #[test]
    fn prop_single_active_version_found(
        others in prop::collection::btree_map("[a-z0-9]{1,6}", "inactive|prepared|", 0..8),
        active in "[a-z0-9]{1,6}",
    ) {
        let mut versions = others;
        versions.insert(active.clone(), "active".to_string());
        let app = app_with(versions);
        prop_assert_eq!(app.active_version(), Some(active.as_str()));
    }

    /// Resolution is deterministic and independent of insertion order.
    #[test]
    fn prop_active_version_deterministic(
        versions in prop::collection::btree_map("[a-z0-9]{1,6}", status(), 0..10),
    ) {
        let mut reversed = BTreeMap::new();
        for (id, s) in versions.iter().rev() {
            reversed.insert(id.clone(), s.clone());
        }

        let a = app_with(versions.clone());
        let b = app_with(reversed);
        let first = a.active_version().map(str::to_owned);
        for _ in 0..3 {
            prop_assert_eq!(a.active_version().map(str::to_owned), first.clone());
        }
        prop_assert_eq!(b.active_version().map(str::to_owned), first.clone());

        let smallest = versions
            .iter()
            .filter(|(_, s)| s.as_str() == "active")
            .map(|(id, _)| id.clone())
            .min();
        prop_assert_eq!(first, smallest);
    }
}

#[test]
fn test_empty_versions_have_no_active_version() {
    assert_eq!(app_with(BTreeMap::new()).active_version(), None);
}
