//! Pattern expressions and definitions.
//!
//! Unknown names and rejected constructions are reported and replaced by
//! `%any`, so the declaration using the pattern stays analyzable.

use std::sync::Arc;

use sym_diagnostic::messages;
use sym_ir::{Name, NodeClass, NodeId, NodeKind, NodeRange, PropRange};
use sym_lattice::{Pattern, PatternError, ShapePattern, Value};

use super::Evaluator;
use crate::{PatternNamespace, State};

impl Evaluator<'_> {
    pub(crate) fn eval_pattern(&self, node: NodeId, state: &mut State) -> Pattern {
        let pattern = self.eval_pattern_kind(node, state);
        // Expressions in pattern position were recorded by `eval`.
        if self.class(node) == NodeClass::Pattern {
            self.record_value(node, NodeClass::Pattern, &Value::pattern(pattern.clone()), state);
        }
        pattern
    }

    fn eval_patterns(&self, nodes: NodeRange, state: &mut State) -> Vec<Pattern> {
        self.arena
            .children(nodes)
            .iter()
            .map(|&node| self.eval_pattern(node, state))
            .collect()
    }

    fn rejected(&self, node: NodeId, error: &PatternError, state: &State) -> Pattern {
        state.add_error(messages::invalid_pattern(self.pos(node), &error.to_string()));
        Pattern::Any
    }

    fn shape_pattern(&self, fields: PropRange, exact: bool, state: &mut State) -> ShapePattern {
        let fields = self.arena.props(fields);
        let patterns: Vec<(&str, Pattern)> = fields
            .iter()
            .map(|field| (self.name(field.key), self.eval_pattern(field.value, state)))
            .collect();
        let mut shape = if exact {
            ShapePattern::exact(patterns)
        } else {
            ShapePattern::inexact(patterns)
        };
        for field in fields.iter().filter(|field| field.optional) {
            shape = shape.with_optional(self.name(field.key));
        }
        shape
    }

    fn eval_pattern_kind(&self, node: NodeId, state: &mut State) -> Pattern {
        match *self.arena.kind(node) {
            NodeKind::PatternIdent(name) => {
                state.context().resolve_named_pattern(name).unwrap_or_else(|| {
                    state.add_error(messages::unknown_pattern(self.pos(node), self.name(name)));
                    Pattern::Any
                })
            }
            NodeKind::PatternMember { namespace, member } => {
                let Some(found) = state.context().resolve_pattern_namespace(namespace) else {
                    state.add_error(messages::unknown_namespace(
                        self.pos(node),
                        self.name(namespace),
                    ));
                    return Pattern::Any;
                };
                match found.member(member) {
                    Some(pattern) => pattern.clone(),
                    None => {
                        state.add_error(messages::unknown_namespace_member(
                            self.pos(node),
                            self.name(namespace),
                            self.name(member),
                        ));
                        Pattern::Any
                    }
                }
            }
            NodeKind::ObjectPattern { fields, exact } => {
                Pattern::object(self.shape_pattern(fields, exact, state))
            }
            NodeKind::RecordPattern { fields, exact } => {
                Pattern::record(self.shape_pattern(fields, exact, state))
            }
            NodeKind::ListPattern(elements) => Pattern::list(self.eval_patterns(elements, state)),
            NodeKind::ListOfPattern(element) => Pattern::list_of(self.eval_pattern(element, state)),
            NodeKind::TuplePattern(elements) => Pattern::tuple(self.eval_patterns(elements, state)),
            NodeKind::UnionPattern { cases, disjoint } => {
                let cases = self.eval_patterns(cases, state);
                Pattern::union(cases, disjoint).unwrap_or_else(|e| self.rejected(node, &e, state))
            }
            NodeKind::IntersectionPattern(cases) => {
                let cases = self.eval_patterns(cases, state);
                Pattern::intersection(cases).unwrap_or_else(|e| self.rejected(node, &e, state))
            }
            NodeKind::DifferencePattern { base, removed } => {
                let base = self.eval_pattern(base, state);
                let removed = self.eval_pattern(removed, state);
                Pattern::difference(base, removed)
            }
            NodeKind::IntRangePattern { start, end } => {
                Pattern::int_range(start, end).unwrap_or_else(|e| self.rejected(node, &e, state))
            }
            NodeKind::ExactPattern(value) => {
                let value = self.eval(value, state);
                Pattern::exact(value).unwrap_or_else(|e| self.rejected(node, &e, state))
            }
            NodeKind::OptionalPattern(inner) => {
                let inner = self.eval_pattern(inner, state);
                Pattern::optional(inner).unwrap_or_else(|e| self.rejected(node, &e, state))
            }
            NodeKind::PathPattern(glob) => Pattern::Path(Some(Arc::from(self.name(glob)))),
            NodeKind::UrlPattern(prefix) => Pattern::Url(Some(Arc::from(self.name(prefix)))),
            NodeKind::HostPattern(host) => Pattern::Host(Some(Arc::from(self.name(host)))),
            NodeKind::FunctionPattern { params, result } => {
                let params = self.eval_patterns(params, state);
                let result = result.present().map(|r| self.eval_pattern(r, state));
                Pattern::function(params, result)
            }
            // An expression in pattern position: a pattern value, or the
            // exact value it evaluates to.
            _ => match self.eval(node, state) {
                Value::Pattern(pattern) => (*pattern).clone(),
                value => Pattern::exact(value).unwrap_or_else(|e| self.rejected(node, &e, state)),
            },
        }
    }

    pub(super) fn eval_pattern_def(&self, node: NodeId, name: Name, pattern: NodeId, state: &mut State) {
        let pattern = self.eval_pattern(pattern, state);
        let defined = state
            .context()
            .add_named_pattern(name, pattern, Some(self.pos(node)), false);
        if let Err(err) = defined {
            state.add_error(messages::pattern_redefinition(
                self.pos(node),
                self.name(name),
                err.previous().cloned(),
            ));
        }
    }

    pub(super) fn eval_namespace_def(
        &self,
        node: NodeId,
        name: Name,
        members: PropRange,
        state: &mut State,
    ) {
        let members: Vec<(Name, Pattern)> = self
            .arena
            .props(members)
            .iter()
            .map(|member| (member.key, self.eval_pattern(member.value, state)))
            .collect();
        let defined = state.context().add_pattern_namespace(
            name,
            PatternNamespace::new(members),
            Some(self.pos(node)),
            false,
        );
        if let Err(err) = defined {
            state.add_error(messages::pattern_redefinition(
                self.pos(node),
                self.name(name),
                err.previous().cloned(),
            ));
        }
    }
}
