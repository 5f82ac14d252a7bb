//! Union, intersection and difference patterns.

use std::sync::Arc;

use crate::{meet, Pattern, PatternError, TestCx, Value};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct UnionPattern {
    pub cases: Vec<Pattern>,
    /// A value matching a disjoint union matches exactly one case.
    pub disjoint: bool,
}

impl UnionPattern {
    pub(crate) fn test_value_in(&self, value: &Value, cx: TestCx<'_>) -> bool {
        let mut matching = self.cases.iter().filter(|c| c.test_value_in(value, cx));
        if self.disjoint {
            matching.next().is_some() && matching.next().is_none()
        } else {
            matching.next().is_some()
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IntersectionPattern {
    pub cases: Vec<Pattern>,
    /// Intersection of the cases' symbolic values, computed once.
    value: Value,
}

impl IntersectionPattern {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DifferencePattern {
    pub base: Pattern,
    pub removed: Pattern,
}

impl DifferencePattern {
    /// Every value `value` approximates must match the base and none may
    /// match the removed pattern. Overlap is assumed when `value` covers
    /// the removed pattern's approximation.
    pub(crate) fn test_value_in(&self, value: &Value, cx: TestCx<'_>) -> bool {
        self.base.test_value_in(value, cx)
            && !self.removed.test_value_in(value, cx)
            && !value.test_in(&self.removed.symbolic_value(), cx)
    }
}

/// Do some runtime values match both patterns?
fn overlaps(a: &Pattern, b: &Pattern) -> bool {
    match (a, b) {
        (
            Pattern::IntRange { start, end },
            Pattern::IntRange {
                start: other_start,
                end: other_end,
            },
        ) => start <= other_end && other_start <= end,
        _ => !meet(&a.symbolic_value(), &b.symbolic_value()).is_never(),
    }
}

impl Pattern {
    /// Integers from `start` to `end`, both included.
    pub fn int_range(start: i64, end: i64) -> Result<Pattern, PatternError> {
        if start > end {
            return Err(PatternError::EmptyRange { start, end });
        }
        Ok(Pattern::IntRange { start, end })
    }

    pub fn difference(base: Pattern, removed: Pattern) -> Pattern {
        Pattern::Difference(Arc::new(DifferencePattern { base, removed }))
    }

    /// Union of `cases`, flattening nested unions of the same disjointness.
    ///
    /// A disjoint union is rejected when two of its cases overlap. A single
    /// case is returned as is.
    pub fn union(
        cases: impl IntoIterator<Item = Pattern>,
        disjoint: bool,
    ) -> Result<Pattern, PatternError> {
        let mut flat: Vec<Pattern> = Vec::new();
        for case in cases {
            match case {
                Pattern::Union(inner) if inner.disjoint == disjoint => {
                    flat.extend(inner.cases.iter().cloned());
                }
                other => flat.push(other),
            }
        }

        if flat.len() <= 1 {
            return flat.pop().ok_or(PatternError::EmptyUnion);
        }

        if disjoint {
            for (i, first) in flat.iter().enumerate() {
                if let Some(second) = flat[i + 1..].iter().find(|second| overlaps(first, second)) {
                    return Err(PatternError::OverlappingCases {
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
        }

        Ok(Pattern::Union(Arc::new(UnionPattern {
            cases: flat,
            disjoint,
        })))
    }

    /// # Panics
    /// Panics when the cases nest deeper than
    /// [`MAX_MEET_DEPTH`](crate::MAX_MEET_DEPTH).
    pub fn intersection(cases: impl IntoIterator<Item = Pattern>) -> Result<Pattern, PatternError> {
        let mut flat: Vec<Pattern> = Vec::new();
        for case in cases {
            match case {
                Pattern::Intersection(inner) => flat.extend(inner.cases.iter().cloned()),
                other => flat.push(other),
            }
        }

        if flat.len() <= 1 {
            return flat.pop().ok_or(PatternError::EmptyIntersection);
        }

        let value = flat
            .iter()
            .fold(Value::Any, |acc, case| meet(&acc, &case.symbolic_value()));
        if value.is_never() {
            tracing::debug!(cases = flat.len(), "intersection pattern matches nothing");
        }

        Ok(Pattern::Intersection(Arc::new(IntersectionPattern {
            cases: flat,
            value,
        })))
    }
}
