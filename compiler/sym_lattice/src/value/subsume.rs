//! Subsumption: `a.test(&b)` iff `a` approximates everything `b` does.

use sym_stack::ensure_sufficient_stack;

use crate::{TestCx, Value};

impl Value {
    /// Subsumption with the default locator matcher.
    pub fn test(&self, other: &Value) -> bool {
        self.test_in(other, TestCx::detached())
    }

    /// # Panics
    /// Panics when nesting exceeds [`MAX_TEST_DEPTH`](crate::MAX_TEST_DEPTH).
    pub fn test_in(&self, other: &Value, cx: TestCx<'_>) -> bool {
        let cx = cx.deeper();
        ensure_sufficient_stack(|| self.test_step(other, cx))
    }

    /// Subsumption in both directions.
    pub fn equivalent(&self, other: &Value) -> bool {
        self.test(other) && other.test(self)
    }

    fn test_step(&self, other: &Value, cx: TestCx<'_>) -> bool {
        // Every possibility of `other` must be covered.
        if let Value::Multi(theirs) = other {
            if matches!(self, Value::Any) {
                return true;
            }
            return theirs.members().iter().all(|o| self.test_in(o, cx));
        }

        match self {
            Value::Any => true,
            Value::Never => matches!(other, Value::Never),
            Value::Nil => matches!(other, Value::Nil),
            Value::Scalar(mine) => matches!(other, Value::Scalar(theirs) if mine.test(theirs)),
            Value::Marker(required) => {
                !matches!(other, Value::Any | Value::Never)
                    && other.capabilities().contains(*required)
            }
            Value::List(mine) => matches!(other, Value::List(theirs) if mine.test_in(theirs, cx)),
            Value::Tuple(mine) => {
                matches!(other, Value::Tuple(theirs) if mine.test_in(theirs, cx))
            }
            Value::Object(mine) => {
                matches!(other, Value::Object(theirs) if mine.test_in(theirs, cx))
            }
            Value::Record(mine) => {
                matches!(other, Value::Record(theirs) if mine.test_in(theirs, cx))
            }
            Value::Dictionary(mine) => {
                matches!(other, Value::Dictionary(theirs) if mine.test_in(theirs, cx))
            }
            Value::KeyList(mine) => matches!(other, Value::KeyList(theirs) if mine.test(theirs)),
            Value::Function(mine) => match other {
                Value::Function(theirs) => mine.test_in(theirs, cx),
                Value::Native(theirs) => mine.test_native_in(theirs, cx),
                _ => false,
            },
            Value::Native(mine) => matches!(other, Value::Native(theirs) if mine.name == theirs.name),
            Value::Routine(mine) => {
                matches!(other, Value::Routine(theirs) if mine.result.test_in(&theirs.result, cx))
            }
            Value::Pattern(mine) => {
                matches!(other, Value::Pattern(theirs) if mine.test_in(theirs, cx))
            }
            Value::Multi(mine) => mine.members().iter().any(|m| m.test_in(other, cx)),
        }
    }
}
