//! One constructor per user-facing defect.
//!
//! Arguments are already-rendered values and patterns, so this crate does
//! not depend on the lattice.

use sym_ir::SourcePos;

use crate::{Diagnostic, ErrorCode};

fn article(noun: &str) -> &'static str {
    match noun.trim_start_matches(['%', '(', '[', '{']).chars().next() {
        Some(c) if "aeiouAEIOU".contains(c) => "an",
        _ => "a",
    }
}

pub fn not_assignable(pos: SourcePos, value: &str, declared: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!(
            "{} {value} is not assignable to a variable of declared type {declared}",
            article(value)
        ))
        .with_label(pos, "assigned here")
}

pub fn cannot_narrow(pos: SourcePos, variable: &str, value: &str, declared: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!(
            "cannot narrow '{variable}' to {value}: it is not a subset of its declared type {declared}"
        ))
        .with_label(pos, "narrowed here")
}

pub fn invalid_binary_operand(pos: SourcePos, op: &str, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!(
            "invalid operand for '{op}': expected {} {expected} but got {} {found}",
            article(expected),
            article(found)
        ))
        .with_label(pos, "operand")
}

pub fn if_test_not_bool(pos: SourcePos, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2004)
        .with_message(format!(
            "if statement test is not a boolean but {} {found}",
            article(found)
        ))
        .with_label(pos, "test")
}

pub fn missing_property(pos: SourcePos, name: &str, value: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2005)
        .with_message(format!("missing property '{name}' in {value}"))
        .with_label(pos, "accessed here")
}

pub fn invalid_arg_count(pos: SourcePos, found: usize, expected: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2006)
        .with_message(format!(
            "invalid number of arguments: {found}, {expected} was expected"
        ))
        .with_label(pos, "call")
}

pub fn invalid_arg(pos: SourcePos, index: usize, found: &str, expected: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2007)
        .with_message(format!(
            "invalid argument at position {index}: {} {found} does not match {expected}",
            article(found)
        ))
        .with_label(pos, "argument")
}

pub fn not_callable(pos: SourcePos, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2008)
        .with_message(format!("{} {found} is not callable", article(found)))
        .with_label(pos, "callee")
}

pub fn not_iterable(pos: SourcePos, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2009)
        .with_message(format!("{} {found} is not iterable", article(found)))
        .with_label(pos, "iterated here")
}

pub fn mutable_in_immutable(pos: SourcePos, container: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2010)
        .with_message(format!(
            "{container} can only contain immutable values, {} {found} is mutable",
            article(found)
        ))
        .with_label(pos, "element")
}

pub fn unknown_variable(pos: SourcePos, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2011)
        .with_message(format!("variable '{name}' is not declared"))
        .with_label(pos, "referenced here")
}

pub fn assignment_to_constant(pos: SourcePos, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2012)
        .with_message(format!("cannot assign to constant '{name}'"))
        .with_label(pos, "assigned here")
}

pub fn invalid_return_value(pos: SourcePos, found: &str, declared: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2013)
        .with_message(format!(
            "{} {found} does not match the declared return type {declared}",
            article(found)
        ))
        .with_label(pos, "returned here")
}

pub fn variable_redeclaration(pos: SourcePos, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2014)
        .with_message(format!("variable '{name}' is already declared in this scope"))
        .with_label(pos, "declared again here")
}

pub fn value_does_not_match(pos: SourcePos, found: &str, pattern: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2015)
        .with_message(format!(
            "{} {found} does not match {pattern}",
            article(found)
        ))
        .with_label(pos, "value")
}

pub fn unknown_pattern(pos: SourcePos, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!("named pattern '%{name}' is not defined"))
        .with_label(pos, "referenced here")
}

pub fn unknown_namespace(pos: SourcePos, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3002)
        .with_message(format!("pattern namespace '%{name}.' is not defined"))
        .with_label(pos, "referenced here")
}

pub fn unknown_namespace_member(pos: SourcePos, namespace: &str, member: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3002)
        .with_message(format!(
            "pattern namespace '%{namespace}.' has no member '{member}'"
        ))
        .with_label(pos, "referenced here")
}

pub fn pattern_redefinition(pos: SourcePos, name: &str, previous: Option<SourcePos>) -> Diagnostic {
    let diag = Diagnostic::error(ErrorCode::E3003)
        .with_message(format!("pattern '%{name}' is already defined"))
        .with_label(pos, "defined again here");
    match previous {
        Some(previous) => diag.with_secondary_label(previous, "first definition"),
        None => diag,
    }
}

pub fn invalid_pattern(pos: SourcePos, reason: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3004)
        .with_message(format!("invalid pattern: {reason}"))
        .with_label(pos, "pattern")
}

pub fn recursive_call_needs_return_type(pos: SourcePos) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4001)
        .with_message("functions called recursively should have a return type")
        .with_label(pos, "recursive call")
}

pub fn native_error(pos: SourcePos, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4002)
        .with_message(message.to_string())
        .with_label(pos, "call")
}

pub fn self_outside_method(pos: SourcePos) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4003)
        .with_message("'self' is only available inside methods")
        .with_label(pos, "used here")
}

pub fn unreachable_arm(pos: SourcePos, pattern: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W3001)
        .with_message(format!(
            "match arm {pattern} is unreachable: earlier arms already match every value it matches"
        ))
        .with_label(pos, "arm")
}
