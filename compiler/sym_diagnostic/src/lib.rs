//! Diagnostics for the symbolic evaluator.
//!
//! Every user-facing defect found during analysis is a [`Diagnostic`] with a
//! stable [`ErrorCode`]. The [`messages`] module holds one constructor per
//! defect so message wording lives in a single place.

mod diagnostic;
mod error_code;
pub mod messages;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
