use thiserror::Error;

/// Rejected pattern construction.
///
/// Reachable from user code, so callers report it as a definition-time
/// diagnostic.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum PatternError {
    #[error("cases {first} and {second} of a disjoint union overlap")]
    OverlappingCases { first: String, second: String },
    #[error("a union needs at least one case")]
    EmptyUnion,
    #[error("an intersection needs at least one case")]
    EmptyIntersection,
    #[error("exact value patterns only accept immutable values, {0} is mutable")]
    MutableExactValue(String),
    #[error("range {start}..{end} is empty")]
    EmptyRange { start: i64, end: i64 },
    #[error("{0} already matches nil and cannot be made optional")]
    OptionalMatchesNil(String),
}
