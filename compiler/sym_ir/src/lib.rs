//! Syntax-side inputs of the symbolic evaluation engine.
//!
//! The engine does not parse. It consumes:
//! - stable node identities (`NodeId`) used as cache keys,
//! - source spans (`Span`, `SourcePos`) for diagnostics,
//! - node-kind discrimination (`NodeKind`, `NodeClass`) for the driver.
//!
//! `NodeArena` is a flat, index-based tree. Parsers (or tests) build it
//! bottom-up and hand it to the evaluator read-only.

mod ast;
mod name;
mod node_id;
mod span;

pub use ast::{
    ArmRange, BinaryOp, MatchArm, Node, NodeArena, NodeClass, NodeKind, NodeRange, Param,
    ParamRange, PropRange, Property, UnaryOp,
};
pub use name::{Name, SharedInterner, StringInterner};
pub use node_id::NodeId;
pub use span::{SourcePos, Span, SpanError};
