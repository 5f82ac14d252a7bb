//! Analysis results: diagnostics and per-node caches.
//!
//! Diagnostics are deduplicated by their located message, since one faulty
//! expression can be reached through several paths. Per-node caches are
//! first-writer-wins: a second write for the same node is ignored.

use rustc_hash::{FxHashMap, FxHashSet};
use sym_diagnostic::Diagnostic;
use sym_ir::{Name, NodeClass, NodeId, SourcePos};
use sym_lattice::{Pattern, Value};

use crate::AnalysisConfig;

/// One variable as seen at a program point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarSnapshot {
    pub name: Name,
    pub value: Value,
    pub definition: Option<SourcePos>,
}

/// Variables visible at a program point, sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSnapshot {
    pub variables: Vec<VarSnapshot>,
}

impl ScopeSnapshot {
    pub fn new(mut variables: Vec<VarSnapshot>) -> Self {
        variables.sort_by_key(|v| v.name);
        ScopeSnapshot { variables }
    }

    pub fn get(&self, name: Name) -> Option<&VarSnapshot> {
        self.variables
            .binary_search_by_key(&name, |v| v.name)
            .ok()
            .map(|index| &self.variables[index])
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct AnalysisStore {
    config: AnalysisConfig,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    error_messages: FxHashSet<String>,
    warning_messages: FxHashSet<String>,
    dropped_errors: usize,

    most_specific: FxHashMap<NodeId, Value>,
    less_specific: FxHashMap<NodeId, Value>,
    expected: FxHashMap<NodeId, Value>,
    specialized_callees: FxHashMap<NodeId, Value>,
    local_scopes: FxHashMap<NodeId, ScopeSnapshot>,
    global_scopes: FxHashMap<NodeId, ScopeSnapshot>,
    context_patterns: FxHashMap<NodeId, Vec<(Name, Pattern)>>,
}

#[cold]
#[inline(never)]
fn unsupported(data: &str, node: NodeId, class: NodeClass) -> ! {
    panic!("{class:?} node {node:?} does not carry {data}")
}

fn check_value_node(node: NodeId, class: NodeClass) {
    if !matches!(class, NodeClass::Expression | NodeClass::Pattern) {
        unsupported("a value", node, class);
    }
}

fn check_scope_node(node: NodeId, class: NodeClass) {
    if !matches!(class, NodeClass::Statement | NodeClass::Block) {
        unsupported("a scope snapshot", node, class);
    }
}

fn check_block_node(node: NodeId, class: NodeClass) {
    if class != NodeClass::Block {
        unsupported("context data", node, class);
    }
}

impl AnalysisStore {
    pub fn new(config: AnalysisConfig) -> Self {
        AnalysisStore {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    // Diagnostics

    /// Record by severity.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.add_error(diagnostic);
        } else {
            self.add_warning(diagnostic);
        }
    }

    pub fn add_error(&mut self, error: Diagnostic) {
        let message = error.located_message();
        if self.error_messages.contains(&message) {
            return;
        }
        if self.config.error_limit_reached(self.errors.len()) {
            self.dropped_errors += 1;
            tracing::debug!(%message, "error limit reached, dropping");
            return;
        }
        tracing::trace!(code = %error.code, %message, "error");
        self.error_messages.insert(message);
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: Diagnostic) {
        let message = warning.located_message();
        if self.warning_messages.insert(message) {
            self.warnings.push(warning);
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors discarded because the error limit was reached.
    pub fn dropped_errors(&self) -> usize {
        self.dropped_errors
    }

    // Node values

    pub fn set_most_specific_node_value(&mut self, node: NodeId, class: NodeClass, value: Value) {
        check_value_node(node, class);
        self.most_specific.entry(node).or_insert(value);
    }

    pub fn most_specific_node_value(&self, node: NodeId, class: NodeClass) -> Option<&Value> {
        check_value_node(node, class);
        self.most_specific.get(&node)
    }

    pub fn set_less_specific_node_value(&mut self, node: NodeId, class: NodeClass, value: Value) {
        check_value_node(node, class);
        self.less_specific.entry(node).or_insert(value);
    }

    pub fn less_specific_node_value(&self, node: NodeId, class: NodeClass) -> Option<&Value> {
        check_value_node(node, class);
        self.less_specific.get(&node)
    }

    /// Value the surrounding code expects at `node` (declared parameter or
    /// variable type), for completion.
    pub fn set_expected_value(&mut self, node: NodeId, class: NodeClass, value: Value) {
        check_value_node(node, class);
        self.expected.entry(node).or_insert(value);
    }

    pub fn expected_value(&self, node: NodeId, class: NodeClass) -> Option<&Value> {
        check_value_node(node, class);
        self.expected.get(&node)
    }

    /// Callee of the call at `node`, with the parameter shapes its native
    /// checker declared for these arguments.
    pub fn set_specialized_callee(&mut self, node: NodeId, class: NodeClass, callee: Value) {
        check_value_node(node, class);
        self.specialized_callees.entry(node).or_insert(callee);
    }

    pub fn specialized_callee(&self, node: NodeId, class: NodeClass) -> Option<&Value> {
        check_value_node(node, class);
        self.specialized_callees.get(&node)
    }

    // Scope snapshots

    pub fn set_local_scope(&mut self, node: NodeId, class: NodeClass, scope: ScopeSnapshot) {
        check_scope_node(node, class);
        self.local_scopes.entry(node).or_insert(scope);
    }

    pub fn local_scope(&self, node: NodeId, class: NodeClass) -> Option<&ScopeSnapshot> {
        check_scope_node(node, class);
        self.local_scopes.get(&node)
    }

    pub fn set_global_scope(&mut self, node: NodeId, class: NodeClass, scope: ScopeSnapshot) {
        check_scope_node(node, class);
        self.global_scopes.entry(node).or_insert(scope);
    }

    pub fn global_scope(&self, node: NodeId, class: NodeClass) -> Option<&ScopeSnapshot> {
        check_scope_node(node, class);
        self.global_scopes.get(&node)
    }

    // Context data

    /// Named patterns visible at the end of a block. A block reached again
    /// (a function literal in a re-evaluated pattern position) keeps its
    /// first tables.
    pub fn set_context_data(&mut self, node: NodeId, class: NodeClass, patterns: Vec<(Name, Pattern)>) {
        check_block_node(node, class);
        self.context_patterns.entry(node).or_insert(patterns);
    }

    pub fn context_data(&self, node: NodeId, class: NodeClass) -> Option<&[(Name, Pattern)]> {
        check_block_node(node, class);
        self.context_patterns.get(&node).map(Vec::as_slice)
    }

    /// Merge a nested unit's results. Diagnostics go through the same
    /// deduplication; cache entries already present here win.
    #[tracing::instrument(level = "debug", skip_all, fields(errors = other.errors.len()))]
    pub fn add_data(&mut self, other: &AnalysisStore) {
        for error in &other.errors {
            self.add_error(error.clone());
        }
        for warning in &other.warnings {
            self.add_warning(warning.clone());
        }
        self.dropped_errors += other.dropped_errors;

        merge_first_wins(&mut self.most_specific, &other.most_specific);
        merge_first_wins(&mut self.less_specific, &other.less_specific);
        merge_first_wins(&mut self.expected, &other.expected);
        merge_first_wins(&mut self.specialized_callees, &other.specialized_callees);
        merge_first_wins(&mut self.local_scopes, &other.local_scopes);
        merge_first_wins(&mut self.global_scopes, &other.global_scopes);
        merge_first_wins(&mut self.context_patterns, &other.context_patterns);
    }
}

fn merge_first_wins<V: Clone>(into: &mut FxHashMap<NodeId, V>, from: &FxHashMap<NodeId, V>) {
    for (node, value) in from {
        into.entry(*node).or_insert_with(|| value.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
