//! Symbolic value lattice and pattern lattice.
//!
//! A [`Value`] is a conservative approximation of the runtime values an
//! expression can produce. `a.test(&b)` holds when every runtime value
//! approximated by `b` is also approximated by `a`.
//!
//! A [`Pattern`] describes a shape constraint. `p.test_value(&v)` holds when
//! every runtime value approximated by `v` matches `p`. Patterns are values
//! too ([`Value::Pattern`]).
//!
//! # Module Structure
//!
//! - `capability`: duck-typed capability bits and their markers
//! - `cx`: recursion guard and injected locator matcher
//! - `value/`: value kinds, subsumption, widening, rendering
//! - `multivalue/`: flattening join and possible-value removal
//! - `meet/`: value intersection
//! - `pattern/`: pattern kinds, matching, construction errors
//! - `external/`: runtime collaborator (matchers and concretization)

mod capability;
mod cx;
mod external;
mod meet;
mod multivalue;
mod pattern;
mod value;

pub use capability::Capabilities;
pub use cx::{TestCx, MAX_TEST_DEPTH};
pub use external::{
    concretize, concretize_pattern, ConcretizeError, DefaultMatcher, ExternalData, LocatorMatcher,
};
pub use meet::{meet, MAX_MEET_DEPTH};
pub use multivalue::{join, remove_possible_value, Multivalue};
pub use pattern::{
    Dependency, DifferencePattern, FunctionPattern, IntersectionPattern, Pattern, PatternError,
    SequencePattern, ShapePattern, UnionPattern,
};
pub use value::{
    DictionaryValue, Elements, FunctionValue, KeyListValue, ListValue, Literal, NativeFunction,
    ObjectValue, RoutineValue, Scalar, ScalarKind, Shape, Signature, Value,
};
