//! Symbolic evaluation engine.
//!
//! Walks a syntax tree and computes, for every expression, a conservative
//! approximation of the values it can produce, reporting provable type
//! errors without executing anything.
//!
//! # Module Structure
//!
//! - `context/`: named patterns and pattern namespaces, forkable
//! - `state/`: scope stack, self receivers, fork/join, callee stack
//! - `store/`: deduplicated diagnostics and per-node caches
//! - `eval/`: reference tree-walking evaluator over a `NodeArena`
//! - `config`: analysis limits and recording switches
//! - `trace`: `RUST_LOG`-driven tracing setup

mod config;
mod context;
mod eval;
mod state;
mod store;
mod trace;

pub use config::AnalysisConfig;
pub use context::{Context, PatternNamespace, RedefinitionError};
pub use eval::{Evaluator, NativeChecker};
pub use state::{NativeError, State, VarInfo};
pub use store::{AnalysisStore, ScopeSnapshot, VarSnapshot};
pub use trace::init_tracing;
