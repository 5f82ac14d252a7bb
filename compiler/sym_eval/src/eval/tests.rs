use std::rc::Rc;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use sym_diagnostic::ErrorCode;
use sym_ir::{BinaryOp, NodeArena, NodeClass, NodeId};
use sym_lattice::{join, NativeFunction, ScalarKind, Value};

use super::*;
use crate::{AnalysisConfig, Context};

const NONE: NodeId = NodeId::INVALID;

fn state_for(arena: &NodeArena, config: AnalysisConfig) -> State {
    State::detached(Context::with_builtins(arena.interner()), config)
}

fn analyze(arena: &NodeArena, module: NodeId) -> State {
    let mut state = state_for(arena, AnalysisConfig::unlimited());
    Evaluator::new(arena).eval_module(module, &mut state);
    state
}

fn codes(state: &State) -> Vec<ErrorCode> {
    state.store().errors().iter().map(|e| e.code).collect()
}

fn value_of(state: &State, arena: &NodeArena, name: &str) -> Value {
    state.get(arena.intern(name)).unwrap().value.clone()
}

/// Value of `name` right after the statement `stmt`.
fn value_at(state: &State, arena: &NodeArena, stmt: NodeId, name: &str) -> Value {
    let store = state.store();
    let scope = store.local_scope(stmt, NodeClass::Statement).unwrap();
    scope.get(arena.intern(name)).unwrap().value.clone()
}

fn maybe_int() -> NativeFunction {
    NativeFunction::new("maybe", Vec::new(), join([Value::Nil, Value::any_int()]))
}

#[test]
fn nil_check_narrows_the_consequent() {
    let mut arena = NodeArena::new("narrow");
    let maybe = arena.ident("maybe");
    let call = arena.call(maybe, []);
    let decl = arena.var("x", NONE, call);
    let x = arena.ident("x");
    let nil = arena.nil();
    let test = arena.binary(BinaryOp::NotEq, x, nil);
    let x_inner = arena.ident("x");
    let inner = arena.var("y", NONE, x_inner);
    let x_else = arena.ident("x");
    let other = arena.var("z", NONE, x_else);
    let then_branch = arena.block([inner]);
    let else_branch = arena.block([other]);
    let if_stmt = arena.if_else(test, then_branch, else_branch);
    let module = arena.module([decl, if_stmt]);

    let mut state = state_for(&arena, AnalysisConfig::unlimited());
    let mut evaluator = Evaluator::new(&arena);
    evaluator.register_native(&mut state, maybe_int(), None);
    evaluator.eval_module(module, &mut state);

    assert_eq!(codes(&state), Vec::<ErrorCode>::new());
    assert_eq!(value_at(&state, &arena, inner, "y"), Value::any_int());
    assert_eq!(value_at(&state, &arena, other, "z"), Value::Nil);
    assert_eq!(
        value_of(&state, &arena, "x"),
        join([Value::Nil, Value::any_int()])
    );
}

#[test]
fn match_arms_narrow_and_flag_unreachable_arms() {
    let mut arena = NodeArena::new("match");
    let maybe = arena.ident("maybe");
    let call = arena.call(maybe, []);
    let decl = arena.var("x", NONE, call);
    let subject = arena.ident("x");

    let int_pattern = arena.pattern_ident("int");
    let x1 = arena.ident("x");
    let on_int = arena.var("i", NONE, x1);
    let int_body = arena.block([on_int]);

    let nil_pattern = arena.pattern_ident("nil");
    let x2 = arena.ident("x");
    let on_nil = arena.var("n", NONE, x2);
    let nil_body = arena.block([on_nil]);

    let again = arena.pattern_ident("int");
    let empty = arena.block([]);

    let stmt = arena.match_on(
        subject,
        [(int_pattern, int_body), (nil_pattern, nil_body), (again, empty)],
    );
    let module = arena.module([decl, stmt]);

    let mut state = state_for(&arena, AnalysisConfig::unlimited());
    let mut evaluator = Evaluator::new(&arena);
    evaluator.register_native(&mut state, maybe_int(), None);
    evaluator.eval_module(module, &mut state);

    assert_eq!(value_at(&state, &arena, on_int, "i"), Value::any_int());
    assert_eq!(value_at(&state, &arena, on_nil, "n"), Value::Nil);
    let warnings: Vec<ErrorCode> = state.store().warnings().iter().map(|w| w.code).collect();
    assert_eq!(warnings, vec![ErrorCode::W3001]);
    assert!(codes(&state).is_empty());
}

#[test]
fn methods_see_their_object_as_self() {
    let mut arena = NodeArena::new("methods");
    let name = arena.string("box");
    let this = arena.self_ref();
    let field = arena.member(this, "name");
    let ret = arena.ret(field);
    let body = arena.block([ret]);
    let method = arena.function([], NONE, body);
    let object = arena.object([("name", name), ("get", method)]);
    let decl = arena.var("o", NONE, object);
    let o = arena.ident("o");
    let get = arena.member(o, "get");
    let call = arena.call(get, []);
    let result = arena.var("n", NONE, call);
    let module = arena.module([decl, result]);

    let state = analyze(&arena, module);

    assert!(codes(&state).is_empty());
    assert_eq!(value_of(&state, &arena, "n"), Value::any_string());
}

#[test]
fn self_outside_a_method_is_reported() {
    let mut arena = NodeArena::new("self");
    let this = arena.self_ref();
    let decl = arena.var("s", NONE, this);
    let module = arena.module([decl]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E4003]);
    assert_eq!(value_of(&state, &arena, "s"), Value::Any);
}

#[test]
fn missing_property_on_an_exact_object() {
    let mut arena = NodeArena::new("member");
    let one = arena.int(1);
    let object = arena.object([("a", one)]);
    let decl = arena.var("o", NONE, object);
    let o = arena.ident("o");
    let b = arena.member(o, "b");
    let read = arena.var("b", NONE, b);
    let module = arena.module([decl, read]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2005]);
}

#[test]
fn arithmetic_operands_must_agree() {
    let mut arena = NodeArena::new("binary");
    let one = arena.int(1);
    let text = arena.string("a");
    let bad = arena.binary(BinaryOp::Add, one, text);
    let s = arena.var("s", NONE, bad);
    let two = arena.int(2);
    let three = arena.int(3);
    let good = arena.binary(BinaryOp::Add, two, three);
    let t = arena.var("t", NONE, good);
    let four = arena.int(4);
    let five = arena.int(5);
    let cmp = arena.binary(BinaryOp::Lt, four, five);
    let c = arena.var("c", NONE, cmp);
    let module = arena.module([s, t, c]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2003]);
    assert_eq!(value_of(&state, &arena, "t"), Value::any_int());
    assert_eq!(value_of(&state, &arena, "c"), Value::any_bool());
}

#[test]
fn if_test_must_be_a_boolean() {
    let mut arena = NodeArena::new("if");
    let one = arena.int(1);
    let empty = arena.block([]);
    let stmt = arena.if_else(one, empty, NONE);
    let module = arena.module([stmt]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2004]);
}

#[test]
fn for_binds_the_element() {
    let mut arena = NodeArena::new("for");
    let one = arena.int(1);
    let empty = arena.block([]);
    let bad = arena.for_in("e", one, empty);
    let two = arena.int(2);
    let list = arena.list([two]);
    let e = arena.ident("e");
    let copy = arena.var("f", NONE, e);
    let body = arena.block([copy]);
    let good = arena.for_in("e", list, body);
    let module = arena.module([bad, good]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2009]);
    assert_eq!(value_at(&state, &arena, copy, "f"), Value::any_int());
    assert!(state.get(arena.intern("e")).is_none());
}

#[test]
fn empty_list_iterates_as_any() {
    let mut arena = NodeArena::new("empty");
    let empty = arena.list([]);
    let decl = arena.var("l", NONE, empty);
    let l = arena.ident("l");
    let e = arena.ident("e");
    let one = arena.int(1);
    let sum = arena.binary(BinaryOp::Add, e, one);
    let inner = arena.var("y", NONE, sum);
    let body = arena.block([inner]);
    let loop_stmt = arena.for_in("e", l, body);
    let module = arena.module([decl, loop_stmt]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![]);
    assert_eq!(value_at(&state, &arena, inner, "y"), Value::any_int());
}

#[test]
fn calls_check_arity_and_arguments() {
    let mut arena = NodeArena::new("calls");
    let int = arena.pattern_ident("int");
    let a = arena.ident("a");
    let ret = arena.ret(a);
    let body = arena.block([ret]);
    let function = arena.function([("a", int)], NONE, body);
    let decl = arena.fn_decl("f", function);

    let f1 = arena.ident("f");
    let no_args = arena.call(f1, []);
    let f2 = arena.ident("f");
    let text = arena.string("x");
    let wrong = arena.call(f2, [text]);
    let f3 = arena.ident("f");
    let one = arena.int(1);
    let right = arena.call(f3, [one]);
    let result = arena.var("r", NONE, right);
    let module = arena.module([decl, no_args, wrong, result]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2006, ErrorCode::E2007]);
    assert_eq!(value_of(&state, &arena, "r"), Value::any_int());
    assert_eq!(
        state.store().expected_value(one, NodeClass::Expression),
        Some(&Value::any_int())
    );
}

#[test]
fn calling_a_non_callable_is_reported() {
    let mut arena = NodeArena::new("callee");
    let one = arena.int(1);
    let decl = arena.var("n", NONE, one);
    let n = arena.ident("n");
    let call = arena.call(n, []);
    let module = arena.module([decl, call]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2008]);
}

#[test]
fn functions_can_be_called_before_their_declaration() {
    let mut arena = NodeArena::new("hoist");
    let g = arena.ident("g");
    let call = arena.call(g, []);
    let early = arena.var("r", NONE, call);
    let int = arena.pattern_ident("int");
    let one = arena.int(1);
    let ret = arena.ret(one);
    let body = arena.block([ret]);
    let function = arena.function([], int, body);
    let decl = arena.fn_decl("g", function);
    let module = arena.module([early, decl]);

    let state = analyze(&arena, module);
    assert!(codes(&state).is_empty());
    assert_eq!(value_of(&state, &arena, "r"), Value::any_int());
}

#[test]
fn returned_values_must_match_the_annotation() {
    let mut arena = NodeArena::new("return");
    let int = arena.pattern_ident("int");
    let text = arena.string("a");
    let ret = arena.ret(text);
    let body = arena.block([ret]);
    let function = arena.function([], int, body);
    let decl = arena.fn_decl("h", function);
    let module = arena.module([decl]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2013]);
}

#[test]
fn inferred_result_includes_nil_for_conditional_returns() {
    let mut arena = NodeArena::new("infer");
    let flag = arena.bool(true);
    let one = arena.int(1);
    let ret = arena.ret(one);
    let then_branch = arena.block([ret]);
    let cond = arena.if_else(flag, then_branch, NONE);
    let body = arena.block([cond]);
    let function = arena.function([], NONE, body);
    let decl = arena.fn_decl("f", function);
    let f = arena.ident("f");
    let call = arena.call(f, []);
    let result = arena.var("r", NONE, call);
    let module = arena.module([decl, result]);

    let state = analyze(&arena, module);
    assert_eq!(
        value_of(&state, &arena, "r"),
        join([Value::int(1), Value::Nil])
    );
}

#[test]
fn natives_report_through_the_error_channel() {
    let mut arena = NodeArena::new("native");
    let check = arena.ident("check");
    let one = arena.int(1);
    let call = arena.call(check, [one]);
    let result = arena.var("r", NONE, call);
    let module = arena.module([result]);

    let mut state = state_for(&arena, AnalysisConfig::unlimited());
    let mut evaluator = Evaluator::new(&arena);
    let checker: NativeChecker = Rc::new(|state: &mut State, args: &[Value]| {
        if !args[0].is_kind(ScalarKind::Str) {
            state.add_native_error("check expects a string", Some(0));
        }
        Some(Value::any_string())
    });
    evaluator.register_native(
        &mut state,
        NativeFunction::new("check", vec![Value::Any], Value::Any),
        Some(checker),
    );
    evaluator.eval_module(module, &mut state);

    assert_eq!(codes(&state), vec![ErrorCode::E4002]);
    assert_eq!(state.store().errors()[0].primary_pos(), Some(&arena.pos(one)));
    assert_eq!(value_of(&state, &arena, "r"), Value::any_string());
}

#[test]
fn natives_can_narrow_their_parameters() {
    let mut arena = NodeArena::new("narrowed");
    let open = arena.ident("open");
    let one = arena.int(1);
    let call = arena.call(open, [one]);
    let module = arena.module([call]);

    let mut state = state_for(&arena, AnalysisConfig::unlimited());
    let mut evaluator = Evaluator::new(&arena);
    let checker: NativeChecker = Rc::new(|state: &mut State, _: &[Value]| {
        state.set_native_params(vec![Value::any_string()]);
        None
    });
    evaluator.register_native(
        &mut state,
        NativeFunction::new("open", vec![Value::Any], Value::Nil),
        Some(checker),
    );
    evaluator.eval_module(module, &mut state);

    assert_eq!(codes(&state), vec![ErrorCode::E2007]);
    assert_eq!(state.store().errors()[0].primary_pos(), Some(&arena.pos(one)));
    let specialized = Value::Native(Arc::new(NativeFunction::new(
        "open",
        vec![Value::any_string()],
        Value::Nil,
    )));
    assert_eq!(
        state.store().specialized_callee(call, NodeClass::Expression),
        Some(&specialized)
    );
    assert_eq!(
        state.store().expected_value(one, NodeClass::Expression),
        Some(&Value::any_string())
    );
    assert!(state.consume_native_params().is_none());
}

#[test]
fn variadic_natives_accept_extra_arguments() {
    let mut arena = NodeArena::new("variadic");
    let print = arena.ident("print");
    let a = arena.int(1);
    let b = arena.string("b");
    let ok = arena.call(print, [a, b]);
    let print_again = arena.ident("print");
    let none = arena.call(print_again, []);
    let module = arena.module([ok, none]);

    let mut state = state_for(&arena, AnalysisConfig::unlimited());
    let mut evaluator = Evaluator::new(&arena);
    evaluator.register_native(
        &mut state,
        NativeFunction::new("print", vec![Value::Any], Value::Nil).variadic(Value::Any),
        None,
    );
    evaluator.eval_module(module, &mut state);

    assert_eq!(codes(&state), vec![ErrorCode::E2006]);
}

#[test]
fn spawn_wraps_the_body_result() {
    let mut arena = NodeArena::new("spawn");
    let one = arena.int(1);
    let ret = arena.ret(one);
    let body = arena.block([ret]);
    let spawn = arena.spawn(body);
    let decl = arena.var("t", NONE, spawn);
    let after = arena.nil();
    let later = arena.var("later", NONE, after);
    let module = arena.module([decl, later]);

    let state = analyze(&arena, module);
    assert_eq!(value_of(&state, &arena, "t"), Value::routine(Value::int(1)));
    assert_eq!(value_of(&state, &arena, "later"), Value::Nil);
}

#[test]
fn pattern_errors_are_diagnostics() {
    let mut arena = NodeArena::new("patterns");
    let int1 = arena.pattern_ident("int");
    let int2 = arena.pattern_ident("int");
    let overlapping = arena.union_pattern([int1, int2], true);
    let bad_union = arena.pattern_def("p", overlapping);

    let nil = arena.pattern_ident("nil");
    let twice = arena.pattern_def("p", nil);

    let int3 = arena.pattern_ident("int");
    let ns = arena.namespace_def("ns", [("a", int3)]);
    let member = arena.pattern_member("ns", "a");
    let one = arena.int(1);
    let good = arena.var("v", member, one);
    let missing_member = arena.pattern_member("ns", "b");
    let two = arena.int(2);
    let bad_member = arena.var("w", missing_member, two);
    let unknown = arena.pattern_ident("nope");
    let three = arena.int(3);
    let bad_name = arena.var("z", unknown, three);

    let module = arena.module([bad_union, twice, ns, good, bad_member, bad_name]);

    let state = analyze(&arena, module);
    assert_eq!(
        codes(&state),
        vec![
            ErrorCode::E3004,
            ErrorCode::E3003,
            ErrorCode::E3002,
            ErrorCode::E3001
        ]
    );
    assert_eq!(value_of(&state, &arena, "v"), Value::int(1));
}

#[test]
fn function_literal_as_a_match_pattern() {
    let mut arena = NodeArena::new("literal");
    let one = arena.int(1);
    let decl = arena.var("x", NONE, one);
    let x = arena.ident("x");
    let fn_body = arena.block([]);
    let literal = arena.function(Vec::<(&str, NodeId)>::new(), NONE, fn_body);
    let test = arena.matches(x, literal);
    let then_branch = arena.block([]);
    let if_stmt = arena.if_else(test, then_branch, NONE);
    let module = arena.module([decl, if_stmt]);

    let state = analyze(&arena, module);
    assert!(!codes(&state).contains(&ErrorCode::E2004));
    assert!(state
        .store()
        .context_data(fn_body, NodeClass::Block)
        .is_some());
    assert!(state.get(arena.intern("x")).is_some());
}

#[test]
fn range_and_difference_patterns_check_declarations() {
    let mut arena = NodeArena::new("ranges");
    let int = arena.pattern_ident("int");
    let small = arena.int_range_pattern(0, 9);
    let outside = arena.difference_pattern(int, small);
    let def = arena.pattern_def("big", outside);
    let big = arena.pattern_ident("big");
    let ten = arena.int(10);
    let good = arena.var("a", big, ten);
    let big_again = arena.pattern_ident("big");
    let five = arena.int(5);
    let bad = arena.var("b", big_again, five);
    let reversed = arena.int_range_pattern(5, 1);
    let one = arena.int(1);
    let rejected = arena.var("c", reversed, one);
    let module = arena.module([def, good, bad, rejected]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2015, ErrorCode::E3004]);
    assert_eq!(value_of(&state, &arena, "a"), Value::int(10));
}

#[test]
fn declarations_are_checked_against_their_pattern() {
    let mut arena = NodeArena::new("declare");
    let int = arena.pattern_ident("int");
    let text = arena.string("s");
    let decl = arena.var("x", int, text);
    let one = arena.int(1);
    let again = arena.var("x", NONE, one);
    let module = arena.module([decl, again]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2015, ErrorCode::E2014]);
    assert_eq!(value_of(&state, &arena, "x"), Value::any_int());
}

#[test]
fn constants_and_immutable_containers() {
    let mut arena = NodeArena::new("immutable");
    let one = arena.int(1);
    let decl = arena.constant("c", NONE, one);
    let c = arena.ident("c");
    let two = arena.int(2);
    let assign = arena.assign(c, two);
    let three = arena.int(3);
    let list = arena.list([three]);
    let tuple = arena.tuple([list]);
    let t = arena.var("t", NONE, tuple);
    let four = arena.int(4);
    let inner = arena.list([four]);
    let record = arena.record([("a", inner)]);
    let r = arena.var("r", NONE, record);
    let module = arena.module([decl, assign, t, r]);

    let state = analyze(&arena, module);
    assert_eq!(
        codes(&state),
        vec![ErrorCode::E2012, ErrorCode::E2010, ErrorCode::E2010]
    );
    assert_eq!(value_of(&state, &arena, "c"), Value::int(1));
}

#[test]
fn property_writes_respect_field_types() {
    let mut arena = NodeArena::new("property");
    let one = arena.int(1);
    let object = arena.object([("a", one)]);
    let decl = arena.var("o", NONE, object);
    let o1 = arena.ident("o");
    let target1 = arena.member(o1, "a");
    let text = arena.string("s");
    let bad = arena.assign(target1, text);
    let o2 = arena.ident("o");
    let target2 = arena.member(o2, "b");
    let two = arena.int(2);
    let missing = arena.assign(target2, two);
    let module = arena.module([decl, bad, missing]);

    let state = analyze(&arena, module);
    assert_eq!(codes(&state), vec![ErrorCode::E2001, ErrorCode::E2005]);
}

#[test]
fn call_depth_limit_skips_bodies() {
    let mut arena = NodeArena::new("depth");
    let one = arena.int(1);
    let ret = arena.ret(one);
    let body = arena.block([ret]);
    let function = arena.function([], NONE, body);
    let decl = arena.fn_decl("f", function);
    let f = arena.ident("f");
    let call = arena.call(f, []);
    let result = arena.var("r", NONE, call);
    let module = arena.module([decl, result]);

    let mut state = state_for(&arena, AnalysisConfig::unlimited().with_max_call_depth(0));
    Evaluator::new(&arena).eval_module(module, &mut state);

    assert_eq!(value_of(&state, &arena, "r"), Value::Any);
    assert!(state.store().local_scope(body, NodeClass::Block).is_none());
}

#[test]
fn nested_units_are_absorbed_once() {
    let mut arena = NodeArena::new("units");
    let one = arena.int(1);
    let shared = arena.global_var("shared", NONE, one);
    let missing = arena.ident("missing");
    let read = arena.var("m", NONE, missing);
    let included = arena.module([shared, read]);

    let shared_ref = arena.global("shared");
    let decl = arena.var("s", NONE, shared_ref);
    let main = arena.module([decl]);

    let evaluator = Evaluator::new(&arena);
    let mut state = state_for(&arena, AnalysisConfig::unlimited());
    let mut unit = state.nested_unit();
    evaluator.eval_module(included, &mut unit);
    assert!(codes(&state).is_empty());

    state.absorb_nested_unit(unit);
    evaluator.eval_module(main, &mut state);

    assert_eq!(codes(&state), vec![ErrorCode::E2011]);
    assert_eq!(value_of(&state, &arena, "s"), Value::int(1));
    assert!(state.get(arena.intern("m")).is_none());
}

#[test]
fn recording_can_be_disabled() {
    let mut arena = NodeArena::new("quiet");
    let one = arena.int(1);
    let decl = arena.var("x", NONE, one);
    let module = arena.module([decl]);

    let config = AnalysisConfig::unlimited()
        .with_node_values(false)
        .with_scope_snapshots(false);
    let mut state = state_for(&arena, config);
    Evaluator::new(&arena).eval_module(module, &mut state);

    assert!(state
        .store()
        .most_specific_node_value(one, NodeClass::Expression)
        .is_none());
    assert!(state.store().local_scope(decl, NodeClass::Statement).is_none());
    assert_eq!(value_of(&state, &arena, "x"), Value::int(1));
}
