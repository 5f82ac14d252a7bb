use std::sync::Arc;

use pretty_assertions::assert_eq;
use sym_ir::{SourcePos, Span, StringInterner};
use sym_lattice::{Pattern, Value};

use super::*;

fn pos(start: u32) -> SourcePos {
    SourcePos::new(Arc::from("unit"), Span::new(start, start + 1))
}

#[test]
fn fork_definitions_stay_in_the_fork() {
    let interner = StringInterner::new();
    let user = interner.intern("user");
    let parent = Context::new();
    let fork = parent.fork();

    fork.add_named_pattern(user, Pattern::Type(Value::any_int()), Some(pos(1)), false)
        .unwrap();

    assert_eq!(parent.resolve_named_pattern(user), None);
    assert_eq!(
        fork.resolve_named_pattern(user),
        Some(Pattern::Type(Value::any_int()))
    );
}

#[test]
fn fork_sees_parent_definitions_added_later() {
    let interner = StringInterner::new();
    let name = interner.intern("later");
    let parent = Context::new();
    let fork = parent.fork();

    parent.add_named_pattern(name, Pattern::Any, None, false).unwrap();

    assert_eq!(fork.resolve_named_pattern(name), Some(Pattern::Any));
}

#[test]
fn redefinition_in_same_table_fails_with_previous_position() {
    let interner = StringInterner::new();
    let name = interner.intern("p");
    let ctx = Context::new();

    ctx.add_named_pattern(name, Pattern::Any, Some(pos(3)), false).unwrap();
    let err = ctx
        .add_named_pattern(name, Pattern::Type(Value::Nil), Some(pos(9)), false)
        .unwrap_err();

    assert_eq!(err.previous(), Some(&pos(3)));
    assert_eq!(ctx.resolve_named_pattern(name), Some(Pattern::Any));
}

#[test]
fn overwrite_replaces_the_definition() {
    let interner = StringInterner::new();
    let name = interner.intern("p");
    let ctx = Context::new();

    ctx.add_named_pattern(name, Pattern::Any, None, false).unwrap();
    ctx.add_named_pattern(name, Pattern::Type(Value::Nil), Some(pos(2)), true)
        .unwrap();

    assert_eq!(ctx.resolve_named_pattern(name), Some(Pattern::Type(Value::Nil)));
    assert_eq!(ctx.named_pattern_position(name), Some(pos(2)));
}

#[test]
fn shadowing_in_a_fork_is_not_a_redefinition() {
    let interner = StringInterner::new();
    let ctx = Context::with_builtins(&interner);
    let int = interner.intern("int");

    assert!(ctx.resolve_named_pattern(int).is_some());
    ctx.add_named_pattern(int, Pattern::Any, Some(pos(0)), false).unwrap();
    assert_eq!(ctx.resolve_named_pattern(int), Some(Pattern::Any));
}

#[test]
fn for_each_lists_parent_entries_first_without_duplicates() {
    let interner = StringInterner::new();
    let [a, b, c] = ["a", "b", "c"].map(|s| interner.intern(s));
    let parent = Context::new();
    parent.add_named_pattern(a, Pattern::Any, None, false).unwrap();
    parent.add_named_pattern(b, Pattern::Any, None, false).unwrap();
    let fork = parent.fork();
    fork.add_named_pattern(c, Pattern::Any, None, false).unwrap();
    fork.add_named_pattern(a, Pattern::Type(Value::Nil), None, false)
        .unwrap();

    let mut seen = Vec::new();
    fork.for_each_pattern(|name, pattern, _| seen.push((name, pattern.clone())));

    assert_eq!(
        seen,
        vec![
            (a, Pattern::Type(Value::Nil)),
            (b, Pattern::Any),
            (c, Pattern::Any),
        ]
    );
    assert_eq!(fork.local_pattern_names(), vec![c, a]);
}

#[test]
fn namespaces_resolve_through_the_chain() {
    let interner = StringInterner::new();
    let ns = interner.intern("ns");
    let member = interner.intern("m");
    let parent = Context::new();
    parent
        .add_pattern_namespace(
            ns,
            PatternNamespace::new([(member, Pattern::Any)]),
            Some(pos(4)),
            false,
        )
        .unwrap();
    let fork = parent.fork();

    let found = fork.resolve_pattern_namespace(ns).unwrap();
    assert_eq!(found.member(member), Some(&Pattern::Any));
    assert_eq!(fork.pattern_namespace_position(ns), Some(pos(4)));

    let err = parent
        .add_pattern_namespace(ns, PatternNamespace::default(), None, false)
        .unwrap_err();
    assert!(matches!(err, RedefinitionError::Namespace { .. }));

    let mut names = Vec::new();
    fork.for_each_pattern_namespace(|name, _, _| names.push(name));
    assert_eq!(names, vec![ns]);
}
