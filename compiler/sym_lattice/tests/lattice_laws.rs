//! Property-based tests for the value lattice.
//!
//! Random values are checked against the algebraic laws the analysis
//! relies on: subsumption is reflexive, widening and joining only ever
//! widen, and joins are flat and minimal.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use sym_lattice::{join, meet, Capabilities, ObjectValue, ScalarKind, Value};

// -- Strategies --

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::bool),
        (-50i64..50).prop_map(Value::int),
        "[a-z]{0,4}".prop_map(|s| Value::string(&s)),
        prop::sample::select(ScalarKind::ALL).prop_map(Value::scalar),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => scalar_strategy(),
        1 => Just(Value::Nil),
        1 => Just(Value::Any),
        1 => Just(Value::marker(Capabilities::ITERABLE)),
        1 => Just(Value::marker(Capabilities::SERIALIZABLE)),
    ]
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c"]).prop_map(str::to_owned)
}

fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::list),
            inner.clone().prop_map(Value::list_of),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::tuple),
            (prop::collection::btree_map(key_strategy(), inner.clone(), 0..3), any::<bool>())
                .prop_map(|(entries, exact)| {
                    let object = ObjectValue::exact(entries);
                    Value::object(if exact { object } else { object.inexact() })
                }),
            prop::collection::btree_map(key_strategy(), inner.clone(), 0..3)
                .prop_map(|entries| Value::record(ObjectValue::exact(entries))),
            prop::collection::vec(inner, 2..4).prop_map(join),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_is_reflexive(value in value_strategy()) {
        prop_assert!(value.test(&value), "{value} does not subsume itself");
    }

    #[test]
    fn widest_subsumes_original(value in value_strategy()) {
        let widest = value.widest_of_type();
        prop_assert!(widest.test(&value), "{widest} does not subsume {value}");
        prop_assert!(widest.test(&widest));
    }

    #[test]
    fn join_subsumes_every_input(values in prop::collection::vec(value_strategy(), 1..5)) {
        let joined = join(values.clone());
        for value in &values {
            prop_assert!(joined.test(value), "{joined} does not subsume {value}");
        }
    }

    #[test]
    fn join_is_flat_and_minimal(values in prop::collection::vec(value_strategy(), 1..5)) {
        let joined = join(values);
        if let Value::Multi(multi) = &joined {
            prop_assert!(multi.len() >= 2);
            for (i, member) in multi.members().iter().enumerate() {
                prop_assert!(!matches!(member, Value::Multi(_) | Value::Never));
                for (j, other) in multi.members().iter().enumerate() {
                    prop_assert!(i == j || !member.test(other), "{member} covers {other}");
                }
            }
        }
    }

    #[test]
    fn join_with_never_is_identity(value in value_strategy()) {
        let joined = join([value.clone(), Value::Never]);
        prop_assert!(joined.test(&value) && value.test(&joined));
    }

    #[test]
    fn meet_with_any_is_identity(value in value_strategy()) {
        prop_assert_eq!(meet(&value, &Value::Any), value.clone());
        prop_assert_eq!(meet(&Value::Any, &value), value);
    }

    #[test]
    fn meet_with_itself_is_identity(value in value_strategy()) {
        // Multivalues distribute over their members and may come back wider.
        prop_assume!(!matches!(value, Value::Multi(_)));
        prop_assert_eq!(meet(&value, &value), value);
    }
}
