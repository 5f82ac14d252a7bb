//! Reference tree-walking evaluator.
//!
//! Computes the value of every expression of a [`NodeArena`], reporting
//! diagnostics into the state's store and continuing past them. Branches
//! are evaluated against forks of the state and joined back.
//!
//! # Module Structure
//!
//! - `statement`: declarations, assignment, control flow, blocks
//! - `expression`: literals, references, containers, operators, spawn
//! - `call`: callable bodies and call sites
//! - `narrow`: refinement of variables along a branch
//! - `pattern`: pattern expressions and definitions

mod call;
mod expression;
mod narrow;
mod pattern;
mod statement;

use std::rc::Rc;

use rustc_hash::FxHashMap;
use sym_ir::{Name, NodeArena, NodeClass, NodeId, NodeKind, SourcePos};
use sym_lattice::{NativeFunction, Value};
use sym_stack::ensure_sufficient_stack;

use crate::State;

/// Behavior of a native function at analysis time.
///
/// Receives the argument values and returns a refined result (`None`
/// keeps the declared one). Problems are reported through
/// [`State::add_native_error`]. The checker runs before arity is checked, so
/// it sees the arguments as written; it may declare the parameter shapes
/// this call accepts with [`State::set_native_params`].
pub type NativeChecker = Rc<dyn Fn(&mut State, &[Value]) -> Option<Value>>;

pub struct Evaluator<'a> {
    arena: &'a NodeArena,
    checkers: FxHashMap<String, NativeChecker>,
}

impl<'a> Evaluator<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Evaluator {
            arena,
            checkers: FxHashMap::default(),
        }
    }

    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    /// Bind `native` as a global constant of `state`, optionally with a
    /// checker run at every call.
    pub fn register_native(
        &mut self,
        state: &mut State,
        native: NativeFunction,
        checker: Option<NativeChecker>,
    ) {
        let name = self.arena.intern(&native.name);
        if let Some(checker) = checker {
            self.checkers.insert(native.name.clone(), checker);
        }
        let value = Value::Native(std::sync::Arc::new(native));
        if !state.set_global(name, value, None, true, None) {
            tracing::debug!(name = self.arena.name(name), "native shadowed by a constant");
        }
    }

    /// Evaluate a module (or block) as the top level of a unit.
    ///
    /// Pushes the module scope and leaves it on the stack, so the final
    /// bindings stay inspectable.
    #[tracing::instrument(level = "debug", skip_all, fields(unit = %self.arena.source()))]
    pub fn eval_module(&self, module: NodeId, state: &mut State) {
        state.push_scope();
        match *self.arena.kind(module) {
            NodeKind::Module(stmts) | NodeKind::Block(stmts) => {
                self.eval_statements(module, stmts, true, state);
            }
            _ => {
                self.eval(module, state);
            }
        }
        tracing::debug!(
            errors = state.store().errors().len(),
            warnings = state.store().warnings().len(),
            "unit analyzed"
        );
    }

    /// Evaluate any node. Statements evaluate to `nil`; pattern nodes to
    /// the pattern value.
    pub fn eval(&self, node: NodeId, state: &mut State) -> Value {
        ensure_sufficient_stack(|| {
            let class = self.arena.kind(node).class();
            match class {
                NodeClass::Expression => {
                    let value = self.eval_expression(node, state);
                    self.record_value(node, class, &value, state);
                    value
                }
                NodeClass::Pattern => Value::pattern(self.eval_pattern(node, state)),
                NodeClass::Statement => {
                    self.eval_statement(node, state);
                    self.record_scopes(node, class, state);
                    Value::Nil
                }
                NodeClass::Block => {
                    self.eval_block(node, state);
                    Value::Nil
                }
            }
        })
    }

    // Helpers

    fn pos(&self, node: NodeId) -> SourcePos {
        self.arena.pos(node)
    }

    fn name(&self, name: Name) -> &'static str {
        self.arena.name(name)
    }

    fn class(&self, node: NodeId) -> NodeClass {
        self.arena.kind(node).class()
    }

    fn record_value(&self, node: NodeId, class: NodeClass, value: &Value, state: &State) {
        if state.config().record_node_values {
            state
                .store_mut()
                .set_most_specific_node_value(node, class, value.clone());
        }
    }

    fn record_less_specific(&self, node: NodeId, value: Value, state: &State) {
        if state.config().record_node_values {
            state
                .store_mut()
                .set_less_specific_node_value(node, self.class(node), value);
        }
    }

    fn record_expected(&self, node: NodeId, value: Value, state: &State) {
        let class = self.class(node);
        if state.config().record_node_values
            && matches!(class, NodeClass::Expression | NodeClass::Pattern)
        {
            state.store_mut().set_expected_value(node, class, value);
        }
    }

    fn record_scopes(&self, node: NodeId, class: NodeClass, state: &State) {
        if state.config().record_scope_snapshots {
            let (local, global) = (state.local_snapshot(), state.global_snapshot());
            let mut store = state.store_mut();
            store.set_local_scope(node, class, local);
            store.set_global_scope(node, class, global);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
