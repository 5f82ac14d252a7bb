//! Evaluation state of one compilation unit.
//!
//! Scope stack: index 0 is the global scope, every later entry a local
//! scope pushed by a block or callable body. Scopes are persistent maps,
//! so [`State::fork`] is O(1) and [`State::join`] is an explicit merge.
//!
//! The diagnostics store is shared by a state and all of its forks.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use sym_diagnostic::{messages, Diagnostic};
use sym_ir::{Name, NodeId, SourcePos};
use sym_lattice::{join, DefaultMatcher, LocatorMatcher, Pattern, TestCx, Value};

use crate::store::{ScopeSnapshot, VarSnapshot};
use crate::{AnalysisConfig, AnalysisStore, Context};

/// What the state knows about a variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarInfo {
    pub value: Value,
    /// Every later value must be assignable to this.
    pub static_type: Pattern,
    pub is_constant: bool,
    pub definition: Option<SourcePos>,
}

/// Error reported by a native function through the temporary channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeError {
    pub message: String,
    /// Argument the error is about, when the native knows.
    pub arg: Option<usize>,
}

#[derive(Clone, Debug, Default)]
struct Scope {
    variables: im::HashMap<Name, VarInfo>,
    self_value: Option<Value>,
}

fn is_assignable(static_type: &Pattern, value: &Value, cx: TestCx<'_>) -> bool {
    // Widen step by step: an exact value may be accepted through its kind.
    static_type.test_value_in(value, cx)
        || static_type.test_value_in(&value.widest_of_type(), cx)
        || static_type.test_value_in(&Value::Any, cx)
}

pub struct State {
    ctx: Context,
    config: AnalysisConfig,
    matcher: Rc<dyn LocatorMatcher>,
    store: Rc<RefCell<AnalysisStore>>,
    scopes: Vec<Scope>,
    next_self: Option<Value>,
    callees: Vec<NodeId>,
    return_type: Option<Pattern>,
    returned: Option<Value>,
    return_conditional: bool,
    native_errors: Vec<NativeError>,
    native_params: Option<Vec<Value>>,
}

impl State {
    /// A state holding only the global scope.
    pub fn new(ctx: Context, config: AnalysisConfig, matcher: Rc<dyn LocatorMatcher>) -> Self {
        State {
            ctx,
            config,
            matcher,
            store: Rc::new(RefCell::new(AnalysisStore::new(config))),
            scopes: vec![Scope::default()],
            next_self: None,
            callees: Vec::new(),
            return_type: None,
            returned: None,
            return_conditional: false,
            native_errors: Vec::new(),
            native_params: None,
        }
    }

    /// A state matching locators with [`DefaultMatcher`].
    pub fn detached(ctx: Context, config: AnalysisConfig) -> Self {
        Self::new(ctx, config, Rc::new(DefaultMatcher))
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> AnalysisConfig {
        self.config
    }

    pub fn test_cx(&self) -> TestCx<'_> {
        TestCx::new(&*self.matcher)
    }

    pub fn store(&self) -> Ref<'_, AnalysisStore> {
        self.store.borrow()
    }

    pub fn store_mut(&self) -> RefMut<'_, AnalysisStore> {
        self.store.borrow_mut()
    }

    pub fn add_error(&self, error: Diagnostic) {
        self.store.borrow_mut().add_error(error);
    }

    pub fn add_warning(&self, warning: Diagnostic) {
        self.store.borrow_mut().add_warning(warning);
    }

    // Scopes

    /// Number of scopes, the global one included.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn has_locals(&self) -> bool {
        self.scopes.len() > 1
    }

    fn assert_has_locals(&self) {
        if !self.has_locals() {
            panic!("no local scope");
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// # Panics
    /// Panics when only the global scope is left.
    pub fn pop_scope(&mut self) {
        self.assert_has_locals();
        self.scopes.pop();
    }

    fn locals(&self) -> &[Scope] {
        &self.scopes[1..]
    }

    fn find_local_mut(&mut self, name: Name) -> Option<&mut VarInfo> {
        self.scopes[1..]
            .iter_mut()
            .rev()
            .find_map(|scope| scope.variables.get_mut(&name))
    }

    // Variables

    /// Declare or redeclare a global. Without a static type, the widest
    /// value of the same kind is used.
    ///
    /// Returns `false`, leaving the global untouched, if it is a constant.
    pub fn set_global(
        &mut self,
        name: Name,
        value: Value,
        static_type: Option<Pattern>,
        constant: bool,
        definition: Option<SourcePos>,
    ) -> bool {
        if self.scopes[0]
            .variables
            .get(&name)
            .is_some_and(|info| info.is_constant)
        {
            return false;
        }
        let static_type = static_type.unwrap_or_else(|| Pattern::Type(value.widest_of_type()));
        self.scopes[0].variables.insert(
            name,
            VarInfo {
                value,
                static_type,
                is_constant: constant,
                definition,
            },
        );
        true
    }

    /// Declare a variable in the innermost local scope.
    ///
    /// # Panics
    /// Panics without a local scope.
    pub fn set_local(
        &mut self,
        name: Name,
        value: Value,
        static_type: Option<Pattern>,
        constant: bool,
        definition: Option<SourcePos>,
    ) {
        self.assert_has_locals();
        let static_type = static_type.unwrap_or_else(|| Pattern::Type(value.widest_of_type()));
        if let Some(scope) = self.scopes.last_mut() {
            scope.variables.insert(
                name,
                VarInfo {
                    value,
                    static_type,
                    is_constant: constant,
                    definition,
                },
            );
        }
    }

    pub fn get_global(&self, name: Name) -> Option<&VarInfo> {
        self.scopes[0].variables.get(&name)
    }

    /// Nearest local definition.
    pub fn get_local(&self, name: Name) -> Option<&VarInfo> {
        self.locals()
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(&name))
    }

    /// Is `name` declared in the innermost local scope itself?
    pub fn is_declared_in_current_scope(&self, name: Name) -> bool {
        self.has_locals()
            && self
                .scopes
                .last()
                .is_some_and(|scope| scope.variables.contains_key(&name))
    }

    /// Locals shadow globals.
    pub fn get(&self, name: Name) -> Option<&VarInfo> {
        self.get_local(name).or_else(|| self.get_global(name))
    }

    fn get_mut(&mut self, name: Name) -> Option<&mut VarInfo> {
        if self.get_local(name).is_some() {
            return self.find_local_mut(name);
        }
        self.scopes[0].variables.get_mut(&name)
    }

    /// Assign a new value, checking it against the static type.
    ///
    /// On failure reports "not assignable", keeps the old value and returns
    /// `false`. Also `false`, silently, for an undeclared variable.
    pub fn update_var(&mut self, name: Name, value: Value, pos: SourcePos) -> bool {
        self.checked_set(name, value, |info, value| {
            messages::not_assignable(pos, &value.to_string(), &info.static_type.to_string())
        })
    }

    /// Refine a variable after a type guard. Same check as
    /// [`State::update_var`], reported as "cannot narrow".
    pub fn narrow_var(&mut self, name: Name, variable: &str, value: Value, pos: SourcePos) -> bool {
        self.checked_set(name, value, |info, value| {
            messages::cannot_narrow(
                pos,
                variable,
                &value.to_string(),
                &info.static_type.to_string(),
            )
        })
    }

    fn checked_set(
        &mut self,
        name: Name,
        value: Value,
        error: impl FnOnce(&VarInfo, &Value) -> Diagnostic,
    ) -> bool {
        let Some(info) = self.get(name) else {
            return false;
        };
        if !is_assignable(&info.static_type, &value, self.test_cx()) {
            let diagnostic = error(info, &value);
            self.add_error(diagnostic);
            return false;
        }
        if let Some(info) = self.get_mut(name) {
            info.value = value;
        }
        true
    }

    /// Replace a value without any check (refining a declaration with its
    /// inferred signature, property writes).
    pub fn override_var(&mut self, name: Name, value: Value) -> bool {
        match self.get_mut(name) {
            Some(info) => {
                info.value = value;
                true
            }
            None => false,
        }
    }

    // Self

    /// # Panics
    /// Panics without a local scope or if the innermost scope already has
    /// a receiver.
    pub fn set_self(&mut self, value: Value) {
        self.assert_has_locals();
        if let Some(scope) = self.scopes.last_mut() {
            if scope.self_value.is_some() {
                panic!("self is already set");
            }
            scope.self_value = Some(value);
        }
    }

    /// # Panics
    /// Panics if the innermost scope has no receiver.
    pub fn unset_self(&mut self) {
        self.assert_has_locals();
        if let Some(scope) = self.scopes.last_mut() {
            if scope.self_value.take().is_none() {
                panic!("self is already unset");
            }
        }
    }

    /// Receiver of the innermost enclosing method.
    pub fn get_self(&self) -> Option<&Value> {
        self.locals()
            .iter()
            .rev()
            .find_map(|scope| scope.self_value.as_ref())
    }

    /// Receiver for the next callable body to be entered.
    ///
    /// # Panics
    /// Panics if one is already pending.
    pub fn set_next_self(&mut self, value: Value) {
        if self.next_self.is_some() {
            panic!("next self is already set");
        }
        self.next_self = Some(value);
    }

    pub fn take_next_self(&mut self) -> Option<Value> {
        self.next_self.take()
    }

    // Fork / join

    /// An isolated copy for exploring one branch.
    ///
    /// The fork gets a child context, a copy of the globals and one local
    /// scope holding every visible local (inner definitions shadowing
    /// outer ones). It shares the store.
    ///
    /// # Panics
    /// Panics without a local scope.
    #[must_use]
    pub fn fork(&self) -> State {
        if !self.has_locals() {
            panic!("cannot fork a state with no local scope");
        }
        let variables = self
            .locals()
            .iter()
            .rev()
            .fold(im::HashMap::new(), |visible, scope| {
                visible.union(scope.variables.clone())
            });
        let local = Scope {
            variables,
            self_value: self.get_self().cloned(),
        };
        State {
            ctx: self.ctx.fork(),
            config: self.config,
            matcher: Rc::clone(&self.matcher),
            store: Rc::clone(&self.store),
            scopes: vec![self.scopes[0].clone(), local],
            next_self: None,
            callees: self.callees.clone(),
            return_type: self.return_type.clone(),
            returned: None,
            return_conditional: false,
            native_errors: Vec::new(),
            native_params: None,
        }
    }

    /// Merge branches back. Every variable known to both sides becomes the
    /// join of the two values; variables only a fork declared are dropped.
    /// A fork's early return is folded in as a conditional return.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn join(&mut self, forks: impl IntoIterator<Item = State>) {
        for fork in forks {
            if let Some(fork_local) = fork.scopes.last().filter(|_| fork.has_locals()) {
                for (name, info) in &fork_local.variables {
                    if let Some(mine) = self.find_local_mut(*name) {
                        join_into(mine, &info.value);
                    } else if let Some(mine) = self.scopes[0].variables.get_mut(name) {
                        join_into(mine, &info.value);
                    }
                }
            }
            for (name, info) in &fork.scopes[0].variables {
                if let Some(mine) = self.scopes[0].variables.get_mut(name) {
                    join_into(mine, &info.value);
                }
            }
            if let Some(value) = fork.returned {
                self.returned = Some(match self.returned.take() {
                    Some(previous) => join([previous, value]),
                    None => value,
                });
                self.return_conditional = true;
            }
        }
    }

    // Callables

    pub fn push_callee(&mut self, callee: NodeId) {
        self.callees.push(callee);
    }

    /// # Panics
    /// Panics on an empty callee stack.
    pub fn pop_callee(&mut self) {
        if self.callees.pop().is_none() {
            panic!("callee stack is empty");
        }
    }

    /// Is `callee`'s body currently being evaluated?
    pub fn is_in_progress(&self, callee: NodeId) -> bool {
        self.callees.contains(&callee)
    }

    pub fn callee_depth(&self) -> usize {
        self.callees.len()
    }

    pub fn set_return_type(&mut self, return_type: Option<Pattern>) {
        self.return_type = return_type;
    }

    pub fn return_type(&self) -> Option<&Pattern> {
        self.return_type.as_ref()
    }

    /// Record a `return` on the current path. It is unconditional.
    pub fn record_return(&mut self, value: Value) {
        self.returned = Some(match self.returned.take() {
            Some(previous) => join([previous, value]),
            None => value,
        });
        self.return_conditional = false;
    }

    /// Has the current path returned for sure?
    pub fn has_returned(&self) -> bool {
        self.returned.is_some() && !self.return_conditional
    }

    /// The returned value and whether some path may not return.
    pub fn take_return(&mut self) -> Option<(Value, bool)> {
        let conditional = std::mem::take(&mut self.return_conditional);
        self.returned.take().map(|value| (value, conditional))
    }

    // Native error channel

    pub fn add_native_error(&mut self, message: impl Into<String>, arg: Option<usize>) {
        self.native_errors.push(NativeError {
            message: message.into(),
            arg,
        });
    }

    /// Drain the errors reported since the last call.
    pub fn consume_native_errors(&mut self) -> Vec<NativeError> {
        std::mem::take(&mut self.native_errors)
    }

    /// Declare, from inside a native checker, the parameter shapes this call
    /// actually accepts. They replace the native's declared parameters when
    /// its arguments are checked.
    pub fn set_native_params(&mut self, params: Vec<Value>) {
        self.native_params = Some(params);
    }

    /// Take the shapes declared since the last call.
    pub fn consume_native_params(&mut self) -> Option<Vec<Value>> {
        self.native_params.take()
    }

    // Nested units

    /// A state for an included unit: fresh store and global scope, same
    /// context and collaborators.
    #[must_use]
    pub fn nested_unit(&self) -> State {
        State::new(self.ctx.clone(), self.config, Rc::clone(&self.matcher))
    }

    /// Merge a nested unit's results exactly once: its store into this
    /// store, and its globals this unit does not already define.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn absorb_nested_unit(&mut self, unit: State) {
        if Rc::ptr_eq(&self.store, &unit.store) {
            panic!("a nested unit must have its own store");
        }
        self.store.borrow_mut().add_data(&unit.store.borrow());
        for (name, info) in &unit.scopes[0].variables {
            if !self.scopes[0].variables.contains_key(name) {
                self.scopes[0].variables.insert(*name, info.clone());
            }
        }
    }

    // Snapshots

    /// Every visible local, inner definitions shadowing outer ones.
    pub fn local_snapshot(&self) -> ScopeSnapshot {
        let mut seen = rustc_hash::FxHashSet::default();
        let variables = self
            .locals()
            .iter()
            .rev()
            .flat_map(|scope| scope.variables.iter())
            .filter(|(name, _)| seen.insert(**name))
            .map(|(name, info)| snapshot(*name, info))
            .collect();
        ScopeSnapshot::new(variables)
    }

    pub fn global_snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot::new(
            self.scopes[0]
                .variables
                .iter()
                .map(|(name, info)| snapshot(*name, info))
                .collect(),
        )
    }
}

fn snapshot(name: Name, info: &VarInfo) -> VarSnapshot {
    VarSnapshot {
        name,
        value: info.value.clone(),
        definition: info.definition.clone(),
    }
}

fn join_into(info: &mut VarInfo, other: &Value) {
    if info.value != *other {
        info.value = join([info.value.clone(), other.clone()]);
    }
}
