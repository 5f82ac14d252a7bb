//! End-to-end analysis of small programs built directly in a [`NodeArena`].

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use sym_diagnostic::ErrorCode;
use sym_eval::{AnalysisConfig, Context, Evaluator, State};
use sym_ir::{NodeArena, NodeClass, NodeId};
use sym_lattice::{join, ObjectValue, Pattern, ShapePattern, Value};

const NONE: NodeId = NodeId::INVALID;

fn analyze(arena: &NodeArena, module: NodeId, config: AnalysisConfig) -> State {
    sym_eval::init_tracing();
    let mut state = State::detached(Context::with_builtins(arena.interner()), config);
    Evaluator::new(arena).eval_module(module, &mut state);
    state
}

fn codes(state: &State) -> Vec<ErrorCode> {
    state.store().errors().iter().map(|e| e.code).collect()
}

fn value_of(state: &State, arena: &NodeArena, name: &str) -> Value {
    state.get(arena.intern(name)).unwrap().value.clone()
}

fn int_field_object(key: &str) -> Value {
    Value::object(
        ObjectValue::exact([(key, Value::any_int())])
            .with_static_type(key, Pattern::Type(Value::any_int())),
    )
}

#[test]
fn list_literal_element_is_a_multivalue() {
    let mut arena = NodeArena::new("list");
    let one = arena.int(1);
    let a = arena.string("a");
    let list = arena.list([one, a]);
    let decl = arena.var("l", NONE, list);
    let module = arena.module([decl]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    let expected = Value::list(vec![Value::any_int(), Value::any_string()]);
    assert_eq!(value_of(&state, &arena, "l"), expected);
    assert_eq!(
        state
            .store()
            .most_specific_node_value(list, NodeClass::Expression),
        Some(&expected)
    );

    let Value::List(list) = expected else {
        panic!("expected a list");
    };
    let Value::Multi(element) = list.element() else {
        panic!("expected a multivalue element");
    };
    assert_eq!(element.members(), &[Value::any_int(), Value::any_string()]);
}

#[test]
fn rejected_assignment_keeps_the_previous_value() {
    let mut arena = NodeArena::new("assign");
    let string = arena.pattern_ident("string");
    let x = arena.string("x");
    let decl = arena.var("s", string, x);
    let target = arena.ident("s");
    let one = arena.int(1);
    let assign = arena.assign(target, one);
    let module = arena.module([decl, assign]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert_eq!(codes(&state), vec![ErrorCode::E2001]);
    assert_eq!(value_of(&state, &arena, "s"), Value::string("x"));
}

#[test]
fn if_else_joins_both_assignments_with_the_prior_value() {
    let mut arena = NodeArena::new("branches");
    let any = arena.pattern_ident("any");
    let nil = arena.nil();
    let decl = arena.var("v", any, nil);

    let flag = arena.bool(true);
    let one = arena.int(1);
    let with_a = arena.object([("a", one)]);
    let v1 = arena.ident("v");
    let assign_a = arena.assign(v1, with_a);
    let then_branch = arena.block([assign_a]);
    let also_one = arena.int(1);
    let with_b = arena.object([("b", also_one)]);
    let v2 = arena.ident("v");
    let assign_b = arena.assign(v2, with_b);
    let else_branch = arena.block([assign_b]);
    let stmt = arena.if_else(flag, then_branch, else_branch);
    let module = arena.module([decl, stmt]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert!(codes(&state).is_empty());

    let value = value_of(&state, &arena, "v");
    let Value::Multi(members) = &value else {
        panic!("expected a multivalue, got {value}");
    };
    assert_eq!(
        members.members(),
        &[Value::Nil, int_field_object("a"), int_field_object("b")]
    );
}

#[test]
fn direct_recursion_needs_a_return_type() {
    let mut arena = NodeArena::new("recursion");
    let f = arena.ident("f");
    let call = arena.call(f, []);
    let ret = arena.ret(call);
    let body = arena.block([ret]);
    let function = arena.function([], NONE, body);
    let decl = arena.fn_decl("f", function);
    let module = arena.module([decl]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert_eq!(codes(&state), vec![ErrorCode::E4001]);
    assert_eq!(
        state.store().errors()[0].primary_pos(),
        Some(&arena.pos(call))
    );
}

#[test]
fn annotated_recursion_is_accepted() {
    let mut arena = NodeArena::new("recursion");
    let f = arena.ident("f");
    let call = arena.call(f, []);
    let ret = arena.ret(call);
    let body = arena.block([ret]);
    let int = arena.pattern_ident("int");
    let function = arena.function([], int, body);
    let decl = arena.fn_decl("f", function);
    let g = arena.ident("f");
    let outer = arena.call(g, []);
    let result = arena.var("r", NONE, outer);
    let module = arena.module([decl, result]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert!(codes(&state).is_empty());
    assert_eq!(value_of(&state, &arena, "r"), Value::any_int());
}

#[test]
fn patterns_defined_in_a_branch_stay_in_the_branch() {
    let mut arena = NodeArena::new("scoped");
    let flag = arena.bool(true);
    let int = arena.pattern_ident("int");
    let def = arena.pattern_def("p", int);
    let p_inside = arena.pattern_ident("p");
    let one = arena.int(1);
    let inside = arena.var("a", p_inside, one);
    let then_branch = arena.block([def, inside]);
    let stmt = arena.if_else(flag, then_branch, NONE);
    let p_after = arena.pattern_ident("p");
    let two = arena.int(2);
    let after = arena.var("b", p_after, two);
    let module = arena.module([stmt, after]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert_eq!(codes(&state), vec![ErrorCode::E3001]);
    assert_eq!(state.store().errors()[0].primary_pos(), Some(&arena.pos(p_after)));
    assert!(state.context().resolve_named_pattern(arena.intern("p")).is_none());
}

#[test]
fn locals_declared_in_a_branch_are_dropped() {
    let mut arena = NodeArena::new("isolation");
    let flag = arena.bool(false);
    let one = arena.int(1);
    let inner = arena.var("inner", NONE, one);
    let then_branch = arena.block([inner]);
    let stmt = arena.if_else(flag, then_branch, NONE);
    let module = arena.module([stmt]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert!(codes(&state).is_empty());
    assert!(state.get(arena.intern("inner")).is_none());
}

#[test]
fn object_patterns_with_optional_fields() {
    let int = || Pattern::Type(Value::any_int());
    let fields = || [("a", int()), ("b", int())];
    let exact = Pattern::object(ShapePattern::exact(fields()).with_optional("b"));
    let inexact = Pattern::object(ShapePattern::inexact(fields()).with_optional("b"));

    let only_a = Value::object(ObjectValue::exact([("a", Value::int(1))]));
    let extra = Value::object(ObjectValue::exact([
        ("a", Value::int(1)),
        ("c", Value::int(1)),
    ]));

    assert!(exact.test_value(&only_a));
    assert!(!exact.test_value(&extra));
    assert!(inexact.test_value(&extra));
}

fn declare_shape(arena: &mut NodeArena, name: &str, exact: bool, with_c: bool) -> NodeId {
    let a_type = arena.pattern_ident("int");
    let b_type = arena.pattern_ident("int");
    let pattern = arena.object_pattern([("a", a_type, false), ("b", b_type, true)], exact);
    let one = arena.int(1);
    let object = if with_c {
        let c = arena.int(1);
        arena.object([("a", one), ("c", c)])
    } else {
        arena.object([("a", one)])
    };
    arena.var(name, pattern, object)
}

#[test]
fn object_pattern_declarations() {
    let mut arena = NodeArena::new("shapes");
    let only_a = declare_shape(&mut arena, "x", true, false);
    let extra_exact = declare_shape(&mut arena, "y", true, true);
    let extra_inexact = declare_shape(&mut arena, "z", false, true);
    let module = arena.module([only_a, extra_exact, extra_inexact]);

    let state = analyze(&arena, module, AnalysisConfig::default());
    assert_eq!(codes(&state), vec![ErrorCode::E2015]);
}

#[test]
fn error_limit_drops_the_excess() {
    let mut arena = NodeArena::new("limit");
    let decls: Vec<NodeId> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let unknown = arena.ident(&format!("missing_{name}"));
            arena.var(name, NONE, unknown)
        })
        .collect();
    let module = arena.module(decls);

    let state = analyze(&arena, module, AnalysisConfig::default().with_error_limit(2));
    assert_eq!(codes(&state), vec![ErrorCode::E2011, ErrorCode::E2011]);
    assert_eq!(state.store().dropped_errors(), 1);
    assert_eq!(value_of(&state, &arena, "c"), Value::Any);
}

#[test]
fn join_absorbs_a_repeated_member() {
    let joined = join([Value::Nil, int_field_object("a"), int_field_object("b")]);
    let again = join([joined.clone(), int_field_object("a")]);
    assert_eq!(joined, again);
}
