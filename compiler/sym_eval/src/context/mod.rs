//! Named patterns and pattern namespaces.
//!
//! A [`Context`] is a table of user-declared patterns with an optional
//! forking parent. Lookups walk the local table and then the parent chain;
//! a fork starts empty, so definitions made in a branch stay in the
//! branch.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sym_ir::{Name, SourcePos, StringInterner};
use sym_lattice::Pattern;
use thiserror::Error;

/// A named group of patterns (`%ns.member`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternNamespace {
    pub members: BTreeMap<Name, Pattern>,
}

impl PatternNamespace {
    pub fn new(members: impl IntoIterator<Item = (Name, Pattern)>) -> Self {
        PatternNamespace {
            members: members.into_iter().collect(),
        }
    }

    pub fn member(&self, name: Name) -> Option<&Pattern> {
        self.members.get(&name)
    }
}

/// The name already exists in the table being written to.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RedefinitionError {
    #[error("named pattern {name:?} is already defined")]
    Pattern {
        name: Name,
        previous: Option<SourcePos>,
    },
    #[error("pattern namespace {name:?} is already defined")]
    Namespace {
        name: Name,
        previous: Option<SourcePos>,
    },
}

impl RedefinitionError {
    /// Where the existing definition was made (`None` for builtins).
    pub fn previous(&self) -> Option<&SourcePos> {
        match self {
            RedefinitionError::Pattern { previous, .. }
            | RedefinitionError::Namespace { previous, .. } => previous.as_ref(),
        }
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    value: T,
    pos: Option<SourcePos>,
}

/// Insertion-ordered table.
#[derive(Debug)]
struct Table<T> {
    entries: FxHashMap<Name, Entry<T>>,
    order: Vec<Name>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            entries: FxHashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    /// Returns the previous definition's position on conflict.
    fn insert(
        &mut self,
        name: Name,
        value: T,
        pos: Option<SourcePos>,
        overwrite: bool,
    ) -> Result<(), Option<SourcePos>> {
        match self.entries.get_mut(&name) {
            Some(entry) if !overwrite => Err(entry.pos.clone()),
            Some(entry) => {
                *entry = Entry { value, pos };
                Ok(())
            }
            None => {
                self.entries.insert(name, Entry { value, pos });
                self.order.push(name);
                Ok(())
            }
        }
    }

    fn get(&self, name: Name) -> Option<&Entry<T>> {
        self.entries.get(&name)
    }

    /// Append own entries after `out`, replacing in place the ones already
    /// listed so every name appears once.
    fn merge_into(&self, out: &mut Vec<(Name, Entry<T>)>) {
        for name in &self.order {
            let Some(entry) = self.entries.get(name) else {
                continue;
            };
            match out.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = entry.clone(),
                None => out.push((*name, entry.clone())),
            }
        }
    }
}

#[derive(Debug, Default)]
struct ContextData {
    parent: Option<Context>,
    patterns: Table<Pattern>,
    namespaces: Table<PatternNamespace>,
}

/// Shared handle to a pattern table. Cloning shares the table; use
/// [`Context::fork`] for an isolated child.
#[derive(Clone, Debug, Default)]
pub struct Context(Rc<RefCell<ContextData>>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A root context holding the builtin patterns, forked once so user
    /// definitions may shadow builtins without a redefinition error.
    pub fn with_builtins(interner: &StringInterner) -> Self {
        let root = Context::new();
        {
            let mut data = root.0.borrow_mut();
            for (name, pattern) in Pattern::builtins() {
                // Builtin names are distinct.
                let _ = data
                    .patterns
                    .insert(interner.intern(name), pattern, None, true);
            }
        }
        root.fork()
    }

    /// A child whose lookups fall through to `self`.
    #[must_use]
    pub fn fork(&self) -> Context {
        Context(Rc::new(RefCell::new(ContextData {
            parent: Some(self.clone()),
            ..ContextData::default()
        })))
    }

    pub fn parent(&self) -> Option<Context> {
        self.0.borrow().parent.clone()
    }

    pub fn add_named_pattern(
        &self,
        name: Name,
        pattern: Pattern,
        pos: Option<SourcePos>,
        overwrite: bool,
    ) -> Result<(), RedefinitionError> {
        tracing::trace!(?name, "define named pattern");
        self.0
            .borrow_mut()
            .patterns
            .insert(name, pattern, pos, overwrite)
            .map_err(|previous| RedefinitionError::Pattern { name, previous })
    }

    pub fn add_pattern_namespace(
        &self,
        name: Name,
        namespace: PatternNamespace,
        pos: Option<SourcePos>,
        overwrite: bool,
    ) -> Result<(), RedefinitionError> {
        tracing::trace!(?name, "define pattern namespace");
        self.0
            .borrow_mut()
            .namespaces
            .insert(name, namespace, pos, overwrite)
            .map_err(|previous| RedefinitionError::Namespace { name, previous })
    }

    pub fn resolve_named_pattern(&self, name: Name) -> Option<Pattern> {
        self.lookup(|data| data.patterns.get(name).map(|e| e.value.clone()))
    }

    pub fn resolve_pattern_namespace(&self, name: Name) -> Option<PatternNamespace> {
        self.lookup(|data| data.namespaces.get(name).map(|e| e.value.clone()))
    }

    /// Definition position of the nearest pattern named `name`.
    pub fn named_pattern_position(&self, name: Name) -> Option<SourcePos> {
        self.lookup(|data| data.patterns.get(name).map(|e| e.pos.clone()))
            .flatten()
    }

    pub fn pattern_namespace_position(&self, name: Name) -> Option<SourcePos> {
        self.lookup(|data| data.namespaces.get(name).map(|e| e.pos.clone()))
            .flatten()
    }

    fn lookup<R>(&self, find: impl Fn(&ContextData) -> Option<R>) -> Option<R> {
        let mut current = self.clone();
        loop {
            let next = {
                let data = current.0.borrow();
                if let Some(found) = find(&data) {
                    return Some(found);
                }
                data.parent.clone()?
            };
            current = next;
        }
    }

    /// Ancestors first, `self` last.
    fn chain(&self) -> Vec<Context> {
        let mut chain = vec![self.clone()];
        while let Some(parent) = chain.last().and_then(Context::parent) {
            chain.push(parent);
        }
        chain.reverse();
        chain
    }

    /// Every visible named pattern, once, in parent-first order. A name
    /// redefined by a fork keeps its ancestor's position in the order but
    /// carries the fork's pattern.
    pub fn patterns(&self) -> Vec<(Name, Pattern, Option<SourcePos>)> {
        let mut out = Vec::new();
        for context in self.chain() {
            context.0.borrow().patterns.merge_into(&mut out);
        }
        out.into_iter()
            .map(|(name, entry)| (name, entry.value, entry.pos))
            .collect()
    }

    pub fn namespaces(&self) -> Vec<(Name, PatternNamespace, Option<SourcePos>)> {
        let mut out = Vec::new();
        for context in self.chain() {
            context.0.borrow().namespaces.merge_into(&mut out);
        }
        out.into_iter()
            .map(|(name, entry)| (name, entry.value, entry.pos))
            .collect()
    }

    pub fn for_each_pattern(&self, mut f: impl FnMut(Name, &Pattern, Option<&SourcePos>)) {
        for (name, pattern, pos) in self.patterns() {
            f(name, &pattern, pos.as_ref());
        }
    }

    pub fn for_each_pattern_namespace(
        &self,
        mut f: impl FnMut(Name, &PatternNamespace, Option<&SourcePos>),
    ) {
        for (name, namespace, pos) in self.namespaces() {
            f(name, &namespace, pos.as_ref());
        }
    }

    /// Patterns defined in this table only, in insertion order.
    pub fn local_pattern_names(&self) -> Vec<Name> {
        self.0.borrow().patterns.order.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
