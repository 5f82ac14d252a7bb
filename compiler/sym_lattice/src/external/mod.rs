//! Runtime collaborator.
//!
//! The lattice never constructs runtime values itself. Locator matching and
//! concretization go through traits the embedding runtime implements;
//! [`DefaultMatcher`] provides glob rules for callers without one.

mod concretize;
mod matcher;

pub use concretize::{concretize, concretize_pattern, ConcretizeError, ExternalData};
pub use matcher::{DefaultMatcher, LocatorMatcher};
