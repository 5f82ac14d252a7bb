//! Property-based tests for forking and joining analysis states.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use sym_eval::{AnalysisConfig, Context, State};
use sym_ir::StringInterner;
use sym_lattice::{Pattern, Value};

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-20i64..20).prop_map(Value::int),
        "[a-c]{0,2}".prop_map(|s| Value::string(&s)),
        any::<bool>().prop_map(Value::bool),
        Just(Value::Nil),
        Just(Value::any_int()),
        Just(Value::any_string()),
    ]
}

fn branch_values() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(leaf_strategy(), 1..4)
}

fn state_with(interner: &StringInterner, value: &Value) -> State {
    let mut state = State::detached(Context::new(), AnalysisConfig::default());
    state.push_scope();
    let x = interner.intern("x");
    state.set_local(x, value.clone(), Some(Pattern::Any), false, None);
    state.set_global(interner.intern("g"), value.clone(), Some(Pattern::Any), false, None);
    state
}

proptest! {
    #[test]
    fn forks_do_not_leak(original in leaf_strategy(), written in leaf_strategy()) {
        let interner = StringInterner::new();
        let (x, g) = (interner.intern("x"), interner.intern("g"));
        let state = state_with(&interner, &original);

        let mut fork = state.fork();
        fork.set_local(x, written.clone(), None, false, None);
        fork.set_global(g, written.clone(), None, false, None);
        fork.set_local(interner.intern("fresh"), written, None, false, None);

        prop_assert_eq!(&state.get_local(x).unwrap().value, &original);
        prop_assert_eq!(&state.get_global(g).unwrap().value, &original);
        prop_assert!(state.get(interner.intern("fresh")).is_none());
    }

    #[test]
    fn join_covers_every_branch(original in leaf_strategy(), branches in branch_values()) {
        let interner = StringInterner::new();
        let (x, g) = (interner.intern("x"), interner.intern("g"));
        let mut state = state_with(&interner, &original);

        let forks: Vec<State> = branches
            .iter()
            .map(|value| {
                let mut fork = state.fork();
                prop_assert!(fork.override_var(x, value.clone()));
                prop_assert!(fork.override_var(g, value.clone()));
                Ok(fork)
            })
            .collect::<Result<_, TestCaseError>>()?;
        state.join(forks);

        for name in [x, g] {
            let joined = &state.get(name).unwrap().value;
            prop_assert!(joined.test(&original), "{} does not cover {}", joined, original);
            for value in &branches {
                prop_assert!(joined.test(value), "{} does not cover {}", joined, value);
            }
        }
        prop_assert!(!state.has_returned());
    }
}
