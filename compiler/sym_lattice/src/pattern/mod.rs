//! Pattern lattice.
//!
//! Three operations:
//! - `test_value(v)`: does every runtime value approximated by `v` match?
//! - `symbolic_value()`: value approximation of everything that matches.
//! - `test(q)`: does `self` match everything `q` matches?
//!
//! Path, URL and host patterns delegate to the runtime's
//! [`LocatorMatcher`](crate::LocatorMatcher) carried by the [`TestCx`].

mod compound;
mod display;
mod error;
mod structural;

pub use compound::{DifferencePattern, IntersectionPattern, UnionPattern};
pub use error::PatternError;
pub use structural::{Dependency, FunctionPattern, SequencePattern, ShapePattern};

use std::sync::Arc;

use sym_stack::ensure_sufficient_stack;

use crate::{join, Capabilities, Literal, LocatorMatcher, ScalarKind, Shape, TestCx, Value};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Pattern {
    /// Matches every value.
    Any,
    /// Matches the values a value approximates (`%int`, `%iterable`, ...).
    Type(Value),
    /// Matches values equivalent to an immutable value.
    Exact(Value),
    Union(Arc<UnionPattern>),
    Intersection(Arc<IntersectionPattern>),
    /// Values matching the base but not the removed pattern.
    Difference(Arc<DifferencePattern>),
    /// Known integers in `start..=end`.
    IntRange { start: i64, end: i64 },
    Object(Arc<ShapePattern>),
    Record(Arc<ShapePattern>),
    List(Arc<SequencePattern>),
    Tuple(Arc<SequencePattern>),
    /// `nil` or the inner pattern.
    Optional(Arc<Pattern>),
    Function(Arc<FunctionPattern>),
    /// Path glob; `None` matches any path.
    Path(Option<Arc<str>>),
    Url(Option<Arc<str>>),
    Host(Option<Arc<str>>),
}

// Construction
impl Pattern {
    /// Rejects mutable payloads, except the "any serializable" placeholder.
    pub fn exact(value: Value) -> Result<Pattern, PatternError> {
        let placeholder = matches!(&value, Value::Marker(c) if c.contains(Capabilities::SERIALIZABLE));
        if value.is_mutable() && !placeholder {
            return Err(PatternError::MutableExactValue(value.to_string()));
        }
        Ok(Pattern::Exact(value))
    }

    pub fn optional(inner: Pattern) -> Result<Pattern, PatternError> {
        if inner.test_value(&Value::Nil) {
            return Err(PatternError::OptionalMatchesNil(inner.to_string()));
        }
        Ok(Pattern::Optional(Arc::new(inner)))
    }

    pub fn object(shape: ShapePattern) -> Pattern {
        Pattern::Object(Arc::new(shape))
    }

    pub fn record(shape: ShapePattern) -> Pattern {
        Pattern::Record(Arc::new(shape))
    }

    pub fn list(elements: Vec<Pattern>) -> Pattern {
        Pattern::List(Arc::new(SequencePattern::Known(elements)))
    }

    pub fn list_of(element: Pattern) -> Pattern {
        Pattern::List(Arc::new(SequencePattern::Of(element)))
    }

    pub fn tuple(elements: Vec<Pattern>) -> Pattern {
        Pattern::Tuple(Arc::new(SequencePattern::Known(elements)))
    }

    pub fn tuple_of(element: Pattern) -> Pattern {
        Pattern::Tuple(Arc::new(SequencePattern::Of(element)))
    }

    pub fn function(params: Vec<Pattern>, result: Option<Pattern>) -> Pattern {
        Pattern::Function(Arc::new(FunctionPattern { params, result }))
    }

    /// Patterns every unit of compilation starts with.
    pub fn builtins() -> Vec<(&'static str, Pattern)> {
        let scalar = |kind| Pattern::Type(Value::scalar(kind));
        let marker = |caps| Pattern::Type(Value::Marker(caps));
        vec![
            ("any", Pattern::Any),
            ("nil", Pattern::Type(Value::Nil)),
            ("bool", scalar(ScalarKind::Bool)),
            ("int", scalar(ScalarKind::Int)),
            ("float", scalar(ScalarKind::Float)),
            ("rune", scalar(ScalarKind::Rune)),
            ("byte", scalar(ScalarKind::Byte)),
            ("str", scalar(ScalarKind::Str)),
            ("string", scalar(ScalarKind::Str)),
            ("identifier", scalar(ScalarKind::Identifier)),
            ("duration", scalar(ScalarKind::Duration)),
            ("date", scalar(ScalarKind::Date)),
            ("port", scalar(ScalarKind::Port)),
            ("email-address", scalar(ScalarKind::EmailAddress)),
            ("bytes", scalar(ScalarKind::ByteSlice)),
            ("path", Pattern::Path(None)),
            ("url", Pattern::Url(None)),
            ("host", Pattern::Host(None)),
            ("list", Pattern::list_of(Pattern::Any)),
            ("tuple", Pattern::tuple_of(Pattern::Any)),
            ("object", Pattern::object(ShapePattern::open())),
            ("record", Pattern::record(ShapePattern::open())),
            ("fn", Pattern::Type(Value::any_function())),
            ("iterable", marker(Capabilities::ITERABLE)),
            ("indexable", marker(Capabilities::INDEXABLE)),
            ("watchable", marker(Capabilities::WATCHABLE)),
            ("serializable", marker(Capabilities::SERIALIZABLE)),
            ("str-like", marker(Capabilities::STR_LIKE)),
            ("bytes-like", marker(Capabilities::BYTES_LIKE)),
            ("resource-name", marker(Capabilities::RESOURCE_NAME)),
            ("pattern", marker(Capabilities::PATTERN)),
        ]
    }
}

fn locator_matches(
    value: &Value,
    kind: ScalarKind,
    pattern: Option<&str>,
    cx: TestCx<'_>,
    matches: fn(&dyn LocatorMatcher, &str, &str) -> bool,
) -> bool {
    let Value::Scalar(scalar) = value else {
        return false;
    };
    if scalar.kind() != kind {
        return false;
    }
    match pattern {
        None => true,
        Some(pattern) => scalar
            .text()
            .is_some_and(|text| matches(cx.matcher(), pattern, text)),
    }
}

fn int_in_range(value: &Value, start: i64, end: i64) -> bool {
    match value {
        Value::Scalar(scalar) if scalar.kind() == ScalarKind::Int => {
            matches!(scalar.literal(), Some(Literal::Int(n)) if (start..=end).contains(n))
        }
        _ => false,
    }
}

fn locator_includes(outer: Option<&str>, inner: Option<&str>, cx: TestCx<'_>) -> bool {
    match (outer, inner) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(outer), Some(inner)) => cx.matcher().pattern_includes(outer, inner),
    }
}

// Matching
impl Pattern {
    pub fn test_value(&self, value: &Value) -> bool {
        self.test_value_in(value, TestCx::detached())
    }

    /// # Panics
    /// Panics when nesting exceeds [`MAX_TEST_DEPTH`](crate::MAX_TEST_DEPTH).
    pub fn test_value_in(&self, value: &Value, cx: TestCx<'_>) -> bool {
        let cx = cx.deeper();
        ensure_sufficient_stack(|| match value {
            // Every possibility must match on its own.
            Value::Multi(multi) => multi.members().iter().all(|m| self.test_value_in(m, cx)),
            Value::Never => matches!(self, Pattern::Any),
            _ => self.match_step(value, cx),
        })
    }

    fn match_step(&self, value: &Value, cx: TestCx<'_>) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Type(ty) => ty.test_in(value, cx),
            Pattern::Exact(exact) => match exact {
                Value::Marker(_) => exact.test_in(value, cx),
                _ => exact.test_in(value, cx) && value.test_in(exact, cx),
            },
            Pattern::Union(union) => union.test_value_in(value, cx),
            Pattern::Intersection(inter) => inter.cases.iter().all(|c| c.test_value_in(value, cx)),
            Pattern::Difference(difference) => difference.test_value_in(value, cx),
            Pattern::IntRange { start, end } => int_in_range(value, *start, *end),
            Pattern::Object(shape) => {
                matches!(value, Value::Object(object) if shape.test_fields(value, object, cx))
            }
            Pattern::Record(shape) => {
                matches!(value, Value::Record(record) if shape.test_fields(value, record, cx))
            }
            Pattern::List(seq) => matches!(value, Value::List(list) if seq.test_elements(list, cx)),
            Pattern::Tuple(seq) => {
                matches!(value, Value::Tuple(tuple) if seq.test_elements(tuple, cx))
            }
            Pattern::Optional(inner) => {
                matches!(value, Value::Nil) || inner.test_value_in(value, cx)
            }
            Pattern::Function(function) => function.test_value_in(value, cx),
            Pattern::Path(glob) => {
                locator_matches(value, ScalarKind::Path, glob.as_deref(), cx, |m, p, v| {
                    m.path_matches(p, v)
                })
            }
            Pattern::Url(prefix) => {
                locator_matches(value, ScalarKind::Url, prefix.as_deref(), cx, |m, p, v| {
                    m.url_matches(p, v)
                })
            }
            Pattern::Host(host) => {
                locator_matches(value, ScalarKind::Host, host.as_deref(), cx, |m, p, v| {
                    m.host_matches(p, v)
                })
            }
        }
    }

    /// Value approximation of everything the pattern matches.
    pub fn symbolic_value(&self) -> Value {
        match self {
            Pattern::Any => Value::Any,
            Pattern::Type(value) | Pattern::Exact(value) => value.clone(),
            Pattern::Union(union) => join(union.cases.iter().map(Pattern::symbolic_value)),
            Pattern::Intersection(inter) => inter.value().clone(),
            Pattern::Difference(difference) => difference.base.symbolic_value(),
            Pattern::IntRange { .. } => Value::any_int(),
            Pattern::Object(shape) => Value::object(shape.symbolic_fields(true)),
            Pattern::Record(shape) => Value::record(shape.symbolic_fields(false)),
            Pattern::List(seq) => Value::List(Arc::new(seq.symbolic_elements())),
            Pattern::Tuple(seq) => Value::Tuple(Arc::new(seq.symbolic_elements())),
            Pattern::Optional(inner) => join([Value::Nil, inner.symbolic_value()]),
            Pattern::Function(function) => Value::Function(Arc::new(function.symbolic_function())),
            Pattern::Path(_) => Value::scalar(ScalarKind::Path),
            Pattern::Url(_) => Value::scalar(ScalarKind::Url),
            Pattern::Host(_) => Value::scalar(ScalarKind::Host),
        }
    }

    /// Pattern-level subsumption with the default locator matcher.
    pub fn test(&self, other: &Pattern) -> bool {
        self.test_in(other, TestCx::detached())
    }

    /// Does `self` match every value `other` matches?
    pub fn test_in(&self, other: &Pattern, cx: TestCx<'_>) -> bool {
        let cx = cx.deeper();
        if let Pattern::Union(theirs) = other {
            if !matches!(self, Pattern::Any) {
                return theirs.cases.iter().all(|case| self.test_in(case, cx));
            }
        }
        match self {
            Pattern::Any => true,
            Pattern::Exact(mine) => {
                matches!(other, Pattern::Exact(theirs) if mine.test_in(theirs, cx) && theirs.test_in(mine, cx))
            }
            Pattern::Union(mine) => {
                mine.cases.iter().any(|case| case.test_in(other, cx))
                    || self.test_value_in(&other.symbolic_value(), cx)
            }
            Pattern::IntRange { start, end } => match other {
                Pattern::IntRange {
                    start: other_start,
                    end: other_end,
                } => start <= other_start && other_end <= end,
                _ => self.test_value_in(&other.symbolic_value(), cx),
            },
            Pattern::Path(mine) => match other {
                Pattern::Path(theirs) => locator_includes(mine.as_deref(), theirs.as_deref(), cx),
                _ => self.test_value_in(&other.symbolic_value(), cx),
            },
            Pattern::Url(mine) => match other {
                Pattern::Url(theirs) => locator_includes(mine.as_deref(), theirs.as_deref(), cx),
                _ => self.test_value_in(&other.symbolic_value(), cx),
            },
            Pattern::Host(mine) => match other {
                Pattern::Host(theirs) => locator_includes(mine.as_deref(), theirs.as_deref(), cx),
                _ => self.test_value_in(&other.symbolic_value(), cx),
            },
            Pattern::Type(_)
            | Pattern::Intersection(_)
            | Pattern::Difference(_)
            | Pattern::Object(_)
            | Pattern::Record(_)
            | Pattern::List(_)
            | Pattern::Tuple(_)
            | Pattern::Optional(_)
            | Pattern::Function(_) => self.test_value_in(&other.symbolic_value(), cx),
        }
    }

    /// Has the pattern a runtime counterpart the embedder can build?
    pub fn is_concretizable(&self) -> bool {
        match self {
            Pattern::Any
            | Pattern::IntRange { .. }
            | Pattern::Path(_)
            | Pattern::Url(_)
            | Pattern::Host(_) => true,
            Pattern::Type(value) => matches!(value, Value::Nil | Value::Scalar(_) | Value::Marker(_)),
            Pattern::Exact(value) => value.is_concretizable(),
            Pattern::Union(union) => union.cases.iter().all(Pattern::is_concretizable),
            Pattern::Intersection(inter) => inter.cases.iter().all(Pattern::is_concretizable),
            Pattern::Difference(difference) => {
                difference.base.is_concretizable() && difference.removed.is_concretizable()
            }
            Pattern::Object(shape) | Pattern::Record(shape) => {
                shape.dependencies.is_empty()
                    && match &shape.fields {
                        Shape::Open => true,
                        Shape::Closed(fields) => fields.values().all(Pattern::is_concretizable),
                    }
            }
            Pattern::List(seq) | Pattern::Tuple(seq) => {
                seq.patterns().iter().all(Pattern::is_concretizable)
            }
            Pattern::Optional(inner) => inner.is_concretizable(),
            Pattern::Function(_) => false,
        }
    }
}
