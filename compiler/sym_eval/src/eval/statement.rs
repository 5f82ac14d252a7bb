//! Declarations, assignment, control flow and blocks.

use std::sync::Arc;

use sym_diagnostic::messages;
use sym_ir::{Name, NodeClass, NodeId, NodeKind, NodeRange};
use sym_lattice::{meet, remove_possible_value, Pattern, Shape, Value};

use super::Evaluator;
use crate::State;

impl Evaluator<'_> {
    pub(super) fn eval_statement(&self, node: NodeId, state: &mut State) {
        match *self.arena.kind(node) {
            NodeKind::VarDecl {
                name,
                pattern,
                init,
                constant,
            } => self.eval_var_decl(node, name, pattern, init, constant, state),
            NodeKind::GlobalDecl {
                name,
                pattern,
                init,
                constant,
            } => self.eval_global_decl(node, name, pattern, init, constant, state),
            NodeKind::Assign { target, value } => self.eval_assign(target, value, state),
            NodeKind::If {
                test,
                then_branch,
                else_branch,
            } => self.eval_if(test, then_branch, else_branch, state),
            NodeKind::Match { subject, arms } => {
                let arms = self.arena.arms(arms);
                self.eval_match(subject, arms, state);
            }
            NodeKind::For {
                binding,
                iterable,
                body,
            } => self.eval_for(node, binding, iterable, body, state),
            NodeKind::Return(value) => self.eval_return(node, value, state),
            NodeKind::FnDecl { name, function } => {
                let value = self.eval_function(function, state);
                self.record_value(function, NodeClass::Expression, &value, state);
                if !state.override_var(name, value.clone()) {
                    state.set_local(name, value, None, true, Some(self.pos(node)));
                }
            }
            NodeKind::PatternDef { name, pattern } => {
                self.eval_pattern_def(node, name, pattern, state);
            }
            NodeKind::NamespaceDef { name, members } => {
                self.eval_namespace_def(node, name, members, state);
            }
            ref other => panic!("{other:?} is not a statement"),
        }
    }

    /// The declared pattern, and the value to bind: the initializer, or the
    /// pattern's value when the initializer does not match.
    fn declared_value(
        &self,
        pattern: NodeId,
        init: NodeId,
        state: &mut State,
    ) -> (Option<Pattern>, Value) {
        let value = self.eval(init, state);
        let Some(pattern) = pattern.present() else {
            return (None, value);
        };
        let pattern = self.eval_pattern(pattern, state);
        self.record_expected(init, pattern.symbolic_value(), state);
        if pattern.test_value_in(&value, state.test_cx()) {
            return (Some(pattern), value);
        }
        state.add_error(messages::value_does_not_match(
            self.pos(init),
            &value.to_string(),
            &pattern.to_string(),
        ));
        let fallback = pattern.symbolic_value();
        (Some(pattern), fallback)
    }

    fn eval_var_decl(
        &self,
        node: NodeId,
        name: Name,
        pattern: NodeId,
        init: NodeId,
        constant: bool,
        state: &mut State,
    ) {
        let (declared, value) = self.declared_value(pattern, init, state);
        if state.is_declared_in_current_scope(name) {
            state.add_error(messages::variable_redeclaration(self.pos(node), self.name(name)));
            return;
        }
        state.set_local(name, value, declared, constant, Some(self.pos(node)));
    }

    fn eval_global_decl(
        &self,
        node: NodeId,
        name: Name,
        pattern: NodeId,
        init: NodeId,
        constant: bool,
        state: &mut State,
    ) {
        let (declared, value) = self.declared_value(pattern, init, state);
        if !state.set_global(name, value, declared, constant, Some(self.pos(node))) {
            state.add_error(messages::assignment_to_constant(self.pos(node), self.name(name)));
        }
    }

    fn eval_assign(&self, target: NodeId, value: NodeId, state: &mut State) {
        let new_value = self.eval(value, state);
        match *self.arena.kind(target) {
            NodeKind::Ident(name) => self.assign_variable(target, name, value, new_value, false, state),
            NodeKind::GlobalIdent(name) => {
                self.assign_variable(target, name, value, new_value, true, state);
            }
            NodeKind::Member { object, name } => {
                self.assign_property(target, object, self.name(name), new_value, state);
            }
            _ => {
                tracing::debug!(?target, "assignment to a non-assignable target");
            }
        }
    }

    fn assign_variable(
        &self,
        target: NodeId,
        name: Name,
        value_node: NodeId,
        new_value: Value,
        global: bool,
        state: &mut State,
    ) {
        let info = if global {
            state.get_global(name)
        } else {
            state.get(name)
        };
        let Some(info) = info else {
            state.add_error(messages::unknown_variable(self.pos(target), self.name(name)));
            return;
        };
        if info.is_constant {
            state.add_error(messages::assignment_to_constant(self.pos(target), self.name(name)));
            return;
        }
        self.record_expected(value_node, info.static_type.symbolic_value(), state);
        state.update_var(name, new_value, self.pos(target));
    }

    fn assign_property(
        &self,
        target: NodeId,
        object: NodeId,
        key: &str,
        new_value: Value,
        state: &mut State,
    ) {
        let receiver = self.eval(object, state);
        match &receiver {
            Value::Object(fields) => {
                if let Shape::Closed(entries) = &fields.entries {
                    if fields.exact && !entries.contains_key(key) {
                        state.add_error(messages::missing_property(
                            self.pos(target),
                            key,
                            &receiver.to_string(),
                        ));
                        return;
                    }
                }
                if let Some(static_type) = fields.static_types.get(key) {
                    if !static_type.test_value_in(&new_value, state.test_cx()) {
                        state.add_error(messages::not_assignable(
                            self.pos(target),
                            &new_value.to_string(),
                            &static_type.to_string(),
                        ));
                        return;
                    }
                }
                let NodeKind::Ident(variable) = *self.arena.kind(object) else {
                    return;
                };
                if let Shape::Closed(entries) = &fields.entries {
                    let mut updated = (**fields).clone();
                    let mut entries = entries.clone();
                    entries.insert(key.to_owned(), new_value.without_payload());
                    updated.entries = Shape::Closed(entries);
                    state.override_var(variable, Value::Object(Arc::new(updated)));
                }
            }
            Value::Any | Value::Multi(_) => {}
            other => state.add_error(messages::missing_property(
                self.pos(target),
                key,
                &other.to_string(),
            )),
        }
    }

    fn eval_if(
        &self,
        test: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
        state: &mut State,
    ) {
        let test_value = self.eval(test, state);
        let is_bool = test_value
            .possibilities()
            .iter()
            .all(|v| v.is_any() || v.is_kind(sym_lattice::ScalarKind::Bool));
        if !is_bool {
            state.add_error(messages::if_test_not_bool(
                self.pos(test),
                &test_value.to_string(),
            ));
        }

        let mut consequent = state.fork();
        self.narrow(test, true, &mut consequent);
        self.eval(then_branch, &mut consequent);
        let mut forks = vec![consequent];

        if let Some(else_branch) = else_branch.present() {
            let mut alternate = state.fork();
            self.narrow(test, false, &mut alternate);
            self.eval(else_branch, &mut alternate);
            forks.push(alternate);
        }
        state.join(forks);
    }

    fn eval_match(&self, subject: NodeId, arms: &[sym_ir::MatchArm], state: &mut State) {
        let subject_value = self.eval(subject, state);
        let variable = match *self.arena.kind(subject) {
            NodeKind::Ident(name) => Some(name),
            _ => None,
        };

        let mut remaining = subject_value;
        let mut earlier: Vec<Pattern> = Vec::new();
        let mut forks = Vec::with_capacity(arms.len());
        for arm in arms {
            let pattern = self.eval_pattern(arm.pattern, state);
            if earlier.iter().any(|p| p.test_in(&pattern, state.test_cx())) {
                state.add_warning(messages::unreachable_arm(
                    self.pos(arm.pattern),
                    &pattern.to_string(),
                ));
            }

            let matched = pattern.symbolic_value();
            let mut fork = state.fork();
            if let Some(variable) = variable {
                let narrowed = meet(&remaining, &matched);
                if !narrowed.is_never() {
                    fork.narrow_var(variable, self.name(variable), narrowed, self.pos(arm.pattern));
                }
            }
            self.eval(arm.body, &mut fork);
            forks.push(fork);

            remaining = remove_possible_value(&remaining, &matched);
            earlier.push(pattern);
        }
        state.join(forks);
    }

    fn eval_for(
        &self,
        node: NodeId,
        binding: Name,
        iterable: NodeId,
        body: NodeId,
        state: &mut State,
    ) {
        let iterated = self.eval(iterable, state);
        let element = iterated.iteration_element().unwrap_or_else(|| {
            state.add_error(messages::not_iterable(
                self.pos(iterable),
                &iterated.to_string(),
            ));
            Value::Any
        });

        // The body may run zero times: join it back like a branch.
        let mut iteration = state.fork();
        iteration.push_scope();
        iteration.set_local(binding, element, None, false, Some(self.pos(node)));
        self.eval(body, &mut iteration);
        iteration.pop_scope();
        state.join([iteration]);
    }

    fn eval_return(&self, node: NodeId, value: NodeId, state: &mut State) {
        let returned = match value.present() {
            Some(value) => self.eval(value, state),
            None => Value::Nil,
        };
        if let Some(declared) = state.return_type().cloned() {
            if !declared.test_value_in(&returned, state.test_cx()) {
                state.add_error(messages::invalid_return_value(
                    self.pos(node),
                    &returned.to_string(),
                    &declared.to_string(),
                ));
            }
        }
        state.record_return(returned);
    }

    pub(super) fn eval_block(&self, block: NodeId, state: &mut State) {
        let (NodeKind::Block(stmts) | NodeKind::Module(stmts)) = *self.arena.kind(block) else {
            panic!("{block:?} is not a block");
        };
        state.push_scope();
        self.eval_statements(block, stmts, false, state);
        state.pop_scope();
    }

    /// Hoist function declarations, then evaluate statements until the
    /// path returns for sure.
    pub(super) fn eval_statements(
        &self,
        block: NodeId,
        stmts: NodeRange,
        top_level: bool,
        state: &mut State,
    ) {
        let stmts = self.arena.children(stmts);
        self.hoist_functions(stmts, top_level, state);
        for &stmt in stmts {
            if state.has_returned() {
                tracing::trace!(?stmt, "unreachable after return");
                break;
            }
            self.eval(stmt, state);
        }

        if state.config().record_scope_snapshots {
            self.record_scopes(block, NodeClass::Block, state);
            let patterns = state
                .context()
                .patterns()
                .into_iter()
                .map(|(name, pattern, _)| (name, pattern))
                .collect();
            state
                .store_mut()
                .set_context_data(block, NodeClass::Block, patterns);
        }
    }

    /// Declare every function of the block with its annotated signature,
    /// so calls may precede declarations. Top-level functions are global
    /// constants.
    fn hoist_functions(&self, stmts: &[NodeId], top_level: bool, state: &mut State) {
        for &stmt in stmts {
            let NodeKind::FnDecl { name, function } = *self.arena.kind(stmt) else {
                continue;
            };
            let declared = self.declared_function(function, state);
            let pos = Some(self.pos(stmt));
            if top_level {
                if !state.set_global(name, declared, None, true, pos) {
                    state.add_error(messages::assignment_to_constant(
                        self.pos(stmt),
                        self.name(name),
                    ));
                }
            } else if state.is_declared_in_current_scope(name) {
                state.add_error(messages::variable_redeclaration(self.pos(stmt), self.name(name)));
            } else {
                state.set_local(name, declared, None, true, pos);
            }
        }
    }
}
