//! Refinement of variables along a branch.
//!
//! Recognized tests: `x match %p`, `x == nil`, `x != nil`, `not`, and the
//! operands of `and` (consequent) or `or` (alternate).

use sym_ir::{BinaryOp, NodeId, NodeKind, UnaryOp};
use sym_lattice::{meet, remove_possible_value, Value};

use super::Evaluator;
use crate::State;

impl Evaluator<'_> {
    /// Narrow the variables `test` constrains, in the branch where it
    /// evaluated to `holds`.
    pub(super) fn narrow(&self, test: NodeId, holds: bool, branch: &mut State) {
        match *self.arena.kind(test) {
            NodeKind::Matches { subject, pattern } => {
                let NodeKind::Ident(variable) = *self.arena.kind(subject) else {
                    return;
                };
                let matched = self.eval_pattern(pattern, branch).symbolic_value();
                self.refine(test, variable, branch, |current| {
                    if holds {
                        meet(current, &matched)
                    } else {
                        remove_possible_value(current, &matched)
                    }
                });
            }
            NodeKind::Binary {
                op: op @ (BinaryOp::Eq | BinaryOp::NotEq),
                left,
                right,
            } => {
                let variable = match (self.arena.kind(left), self.arena.kind(right)) {
                    (NodeKind::Ident(variable), NodeKind::Nil)
                    | (NodeKind::Nil, NodeKind::Ident(variable)) => *variable,
                    _ => return,
                };
                let is_nil = (op == BinaryOp::Eq) == holds;
                self.refine(test, variable, branch, |current| {
                    if is_nil {
                        meet(current, &Value::Nil)
                    } else {
                        remove_possible_value(current, &Value::Nil)
                    }
                });
            }
            NodeKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } if holds => {
                self.narrow(left, true, branch);
                self.narrow(right, true, branch);
            }
            NodeKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } if !holds => {
                self.narrow(left, false, branch);
                self.narrow(right, false, branch);
            }
            NodeKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.narrow(operand, !holds, branch),
            _ => {}
        }
    }

    /// An empty refinement means the branch is dead; the variable is left
    /// as is.
    fn refine(
        &self,
        test: NodeId,
        variable: sym_ir::Name,
        branch: &mut State,
        refine: impl FnOnce(&Value) -> Value,
    ) {
        let Some(current) = branch.get(variable).map(|info| info.value.clone()) else {
            return;
        };
        let narrowed = refine(&current);
        if narrowed.is_never() || narrowed == current {
            return;
        }
        tracing::trace!(variable = self.name(variable), %narrowed, "narrow");
        branch.narrow_var(variable, self.name(variable), narrowed, self.pos(test));
    }
}
