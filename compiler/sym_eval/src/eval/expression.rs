//! Literals, references, containers, operators and spawn.

use std::collections::{BTreeMap, BTreeSet};

use sym_diagnostic::messages;
use sym_ir::{BinaryOp, NodeClass, NodeId, NodeKind, PropRange, UnaryOp};
use sym_lattice::{join, ObjectValue, Pattern, ScalarKind, Shape, Value};

use super::Evaluator;
use crate::State;

/// What an operand contributes to an arithmetic or comparison operator.
enum Operand {
    Number(ScalarKind),
    Unknown,
    Invalid,
}

fn operand(value: &Value) -> Operand {
    let mut kind = None;
    for possibility in value.possibilities() {
        match possibility {
            Value::Any => return Operand::Unknown,
            Value::Scalar(scalar)
                if matches!(scalar.kind(), ScalarKind::Int | ScalarKind::Float) =>
            {
                match kind {
                    None => kind = Some(scalar.kind()),
                    Some(k) if k == scalar.kind() => {}
                    Some(_) => return Operand::Invalid,
                }
            }
            _ => return Operand::Invalid,
        }
    }
    kind.map_or(Operand::Invalid, Operand::Number)
}

fn all_of_kind(value: &Value, kind: ScalarKind) -> bool {
    value
        .possibilities()
        .iter()
        .all(|v| v.is_any() || v.is_kind(kind))
}

impl Evaluator<'_> {
    pub(super) fn eval_expression(&self, node: NodeId, state: &mut State) -> Value {
        match *self.arena.kind(node) {
            NodeKind::Nil => Value::Nil,
            NodeKind::Bool(b) => Value::bool(b),
            NodeKind::Int(i) => Value::int(i),
            NodeKind::Float(bits) => Value::float(f64::from_bits(bits)),
            NodeKind::Str(s) => Value::string(self.name(s)),
            NodeKind::Rune(c) => Value::rune(c),
            NodeKind::PathLit(s) => Value::text(ScalarKind::Path, self.name(s)),
            NodeKind::UrlLit(s) => Value::text(ScalarKind::Url, self.name(s)),
            NodeKind::HostLit(s) => Value::text(ScalarKind::Host, self.name(s)),

            NodeKind::Ident(name) => match state.get(name) {
                Some(info) => {
                    let value = info.value.clone();
                    self.record_less_specific(node, info.static_type.symbolic_value(), state);
                    value
                }
                None => {
                    state.add_error(messages::unknown_variable(self.pos(node), self.name(name)));
                    Value::Any
                }
            },
            NodeKind::GlobalIdent(name) => match state.get_global(name) {
                Some(info) => info.value.clone(),
                None => {
                    state.add_error(messages::unknown_variable(self.pos(node), self.name(name)));
                    Value::Any
                }
            },
            NodeKind::SelfRef => match state.get_self() {
                Some(receiver) => receiver.clone(),
                None => {
                    state.add_error(messages::self_outside_method(self.pos(node)));
                    Value::Any
                }
            },

            NodeKind::List(elements) => {
                // Mutable: elements may be reassigned, keep only their kind.
                let elements = self
                    .arena
                    .children(elements)
                    .iter()
                    .map(|&e| self.eval(e, state).without_payload())
                    .collect();
                Value::list(elements)
            }
            NodeKind::Tuple(elements) => {
                let elements = self
                    .arena
                    .children(elements)
                    .iter()
                    .map(|&e| self.immutable_element(e, "a tuple", state))
                    .collect();
                Value::tuple(elements)
            }
            NodeKind::Object(props) => self.eval_object(props, state),
            NodeKind::Record(props) => {
                let entries: BTreeMap<String, Value> = self
                    .arena
                    .props(props)
                    .iter()
                    .map(|prop| {
                        let value = self.immutable_element(prop.value, "a record", state);
                        (self.name(prop.key).to_owned(), value)
                    })
                    .collect();
                Value::record(ObjectValue::exact(entries))
            }

            NodeKind::Member { object, name } => {
                let receiver = self.eval(object, state);
                self.member(node, &receiver, self.name(name), state)
            }
            NodeKind::Binary { op, left, right } => self.eval_binary(op, left, right, state),
            NodeKind::Unary { op, operand } => self.eval_unary(op, operand, state),
            NodeKind::Call { callee, args } => {
                let args = self.arena.children(args);
                self.eval_call(node, callee, args, state)
            }
            NodeKind::Function { .. } => self.eval_function(node, state),
            NodeKind::Spawn { body } => self.eval_spawn(body, state),
            NodeKind::Matches { subject, pattern } => {
                self.eval(subject, state);
                self.eval_pattern(pattern, state);
                Value::any_bool()
            }
            ref other => panic!("{other:?} is not an expression"),
        }
    }

    fn immutable_element(&self, element: NodeId, container: &str, state: &mut State) -> Value {
        let value = self.eval(element, state);
        if value.is_mutable() {
            state.add_error(messages::mutable_in_immutable(
                self.pos(element),
                container,
                &value.to_string(),
            ));
        }
        value
    }

    /// Fields first, then methods with the object bound as `self`.
    fn eval_object(&self, props: PropRange, state: &mut State) -> Value {
        let props = self.arena.props(props);
        let is_method = |value: NodeId| matches!(self.arena.kind(value), NodeKind::Function { .. });

        let mut entries = BTreeMap::new();
        let mut static_types = BTreeMap::new();
        for prop in props {
            let key = self.name(prop.key).to_owned();
            let value = if is_method(prop.value) {
                Value::any_function()
            } else {
                self.eval(prop.value, state).without_payload()
            };
            static_types.insert(key.clone(), Pattern::Type(value.widest_of_type()));
            entries.insert(key, value);
        }

        let object = |entries: BTreeMap<String, Value>, static_types: &BTreeMap<String, Pattern>| {
            Value::object(ObjectValue {
                entries: Shape::Closed(entries),
                optional: BTreeSet::new(),
                exact: true,
                static_types: static_types.clone(),
            })
        };

        if !props.iter().any(|prop| is_method(prop.value)) {
            return object(entries, &static_types);
        }
        let receiver = object(entries.clone(), &static_types);
        for prop in props.iter().filter(|prop| is_method(prop.value)) {
            state.set_next_self(receiver.clone());
            let method = self.eval(prop.value, state);
            entries.insert(self.name(prop.key).to_owned(), method);
        }
        object(entries, &static_types)
    }

    fn member(&self, node: NodeId, receiver: &Value, key: &str, state: &mut State) -> Value {
        let mut found = Vec::new();
        let mut missing = false;
        for possibility in receiver.possibilities() {
            match possibility {
                Value::Any => found.push(Value::Any),
                Value::Object(fields) | Value::Record(fields) => match &fields.entries {
                    Shape::Open => found.push(Value::Any),
                    Shape::Closed(entries) => match entries.get(key) {
                        Some(value) => {
                            found.push(value.clone());
                            if fields.is_optional(key) {
                                found.push(Value::Nil);
                            }
                        }
                        None if !fields.exact => found.push(Value::Any),
                        None => missing = true,
                    },
                },
                _ => missing = true,
            }
        }
        if missing {
            state.add_error(messages::missing_property(
                self.pos(node),
                key,
                &receiver.to_string(),
            ));
            return Value::Any;
        }
        join(found)
    }

    fn operand_error(&self, node: NodeId, op: BinaryOp, expected: &str, found: &Value, state: &State) {
        state.add_error(messages::invalid_binary_operand(
            self.pos(node),
            op.as_str(),
            expected,
            &found.to_string(),
        ));
    }

    fn eval_binary(&self, op: BinaryOp, left: NodeId, right: NodeId, state: &mut State) -> Value {
        let lhs = self.eval(left, state);
        let rhs = self.eval(right, state);

        match op {
            BinaryOp::Eq | BinaryOp::NotEq => Value::any_bool(),
            BinaryOp::And | BinaryOp::Or => {
                for (node, value) in [(left, &lhs), (right, &rhs)] {
                    if !all_of_kind(value, ScalarKind::Bool) {
                        self.operand_error(node, op, "%bool", value, state);
                    }
                }
                Value::any_bool()
            }
            BinaryOp::Concat => {
                if all_of_kind(&lhs, ScalarKind::Str) && all_of_kind(&rhs, ScalarKind::Str) {
                    return Value::any_string();
                }
                match (&lhs, &rhs) {
                    (Value::List(a), Value::List(b)) => match (a.known_elements(), b.known_elements()) {
                        (Some(x), Some(y)) => Value::list(x.iter().chain(y).cloned().collect()),
                        _ => Value::list_of(join([a.element(), b.element()])),
                    },
                    (Value::List(_) | Value::Scalar(_), _) => {
                        self.operand_error(right, op, &lhs.widest_of_type().to_string(), &rhs, state);
                        Value::Any
                    }
                    _ => {
                        self.operand_error(left, op, "%str or a list", &lhs, state);
                        Value::Any
                    }
                }
            }
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => {
                let kind = match (operand(&lhs), operand(&rhs)) {
                    (Operand::Invalid, _) => {
                        self.operand_error(left, op, "%int or %float", &lhs, state);
                        None
                    }
                    (Operand::Number(l), Operand::Number(r)) if l != r => {
                        self.operand_error(right, op, &Value::scalar(l).to_string(), &rhs, state);
                        None
                    }
                    (Operand::Number(l), Operand::Invalid) => {
                        self.operand_error(right, op, &Value::scalar(l).to_string(), &rhs, state);
                        None
                    }
                    (Operand::Unknown, Operand::Invalid) => {
                        self.operand_error(right, op, "%int or %float", &rhs, state);
                        None
                    }
                    (Operand::Number(kind), _) | (Operand::Unknown, Operand::Number(kind)) => Some(kind),
                    (Operand::Unknown, Operand::Unknown) => None,
                };
                if op.is_comparison() {
                    Value::any_bool()
                } else {
                    kind.map_or(Value::Any, Value::scalar)
                }
            }
        }
    }

    fn eval_unary(&self, op: UnaryOp, operand_node: NodeId, state: &mut State) -> Value {
        let value = self.eval(operand_node, state);
        match op {
            UnaryOp::Not => {
                if !all_of_kind(&value, ScalarKind::Bool) {
                    state.add_error(messages::invalid_binary_operand(
                        self.pos(operand_node),
                        "not",
                        "%bool",
                        &value.to_string(),
                    ));
                }
                Value::any_bool()
            }
            UnaryOp::Neg => match operand(&value) {
                Operand::Number(kind) => Value::scalar(kind),
                Operand::Unknown => Value::Any,
                Operand::Invalid => {
                    state.add_error(messages::invalid_binary_operand(
                        self.pos(operand_node),
                        "-",
                        "%int or %float",
                        &value.to_string(),
                    ));
                    Value::Any
                }
            },
        }
    }

    /// The body runs against a fork with its own return slot; the handle
    /// carries what it returns.
    fn eval_spawn(&self, body: NodeId, state: &mut State) -> Value {
        let mut routine = state.fork();
        routine.push_scope();
        routine.set_return_type(None);
        let value = self.eval(body, &mut routine);
        let result = match routine.take_return() {
            Some((returned, false)) => returned,
            Some((returned, true)) => join([returned, Value::Nil]),
            // An expression body yields its own value.
            None if self.class(body) == NodeClass::Expression => value,
            None => Value::Nil,
        };
        routine.pop_scope();
        Value::routine(result)
    }
}
