//! Value lattice.
//!
//! Three families of kinds:
//! - exact-or-unknown scalars ([`Scalar`]),
//! - structural containers (lists, tuples, objects, records, dictionaries,
//!   key lists) compared field by field,
//! - capability markers standing for "any value fulfilling X".
//!
//! `Any` subsumes everything; `Never` (an impossible path) subsumes nothing
//! except `Never` and is dropped by [`join`](crate::join).

mod callable;
mod container;
mod display;
mod scalar;
mod subsume;

pub use callable::{FunctionValue, NativeFunction, RoutineValue, Signature};
pub use container::{DictionaryValue, Elements, KeyListValue, ListValue, ObjectValue, Shape};
pub use scalar::{Literal, Scalar, ScalarKind};
pub(crate) use display::write_separated;

use std::sync::Arc;

use crate::{join, Capabilities, Multivalue, Pattern};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Value {
    Any,
    Never,
    Nil,
    Scalar(Scalar),
    /// Any value fulfilling every listed capability.
    Marker(Capabilities),
    List(Arc<ListValue>),
    Tuple(Arc<ListValue>),
    Object(Arc<ObjectValue>),
    Record(Arc<ObjectValue>),
    Dictionary(Arc<DictionaryValue>),
    KeyList(Arc<KeyListValue>),
    Function(Arc<FunctionValue>),
    Native(Arc<NativeFunction>),
    Routine(Arc<RoutineValue>),
    Pattern(Arc<Pattern>),
    Multi(Multivalue),
}

// Constructors
impl Value {
    pub fn scalar(kind: ScalarKind) -> Value {
        Value::Scalar(Scalar::unknown(kind))
    }

    fn exact_scalar(kind: ScalarKind, literal: Literal) -> Value {
        match Scalar::exact(kind, literal) {
            Some(scalar) => Value::Scalar(scalar),
            None => Value::scalar(kind),
        }
    }

    pub fn bool(b: bool) -> Value {
        Value::exact_scalar(ScalarKind::Bool, Literal::Bool(b))
    }

    pub fn int(i: i64) -> Value {
        Value::exact_scalar(ScalarKind::Int, Literal::Int(i))
    }

    pub fn float(f: f64) -> Value {
        Value::exact_scalar(ScalarKind::Float, Literal::Float(f.to_bits()))
    }

    pub fn rune(c: char) -> Value {
        Value::exact_scalar(ScalarKind::Rune, Literal::Rune(c))
    }

    pub fn byte(b: u8) -> Value {
        Value::exact_scalar(ScalarKind::Byte, Literal::Byte(b))
    }

    pub fn string(s: &str) -> Value {
        Value::text(ScalarKind::Str, s)
    }

    /// A text-carrying scalar (string, identifier, path, url, host, ...).
    pub fn text(kind: ScalarKind, s: &str) -> Value {
        Value::exact_scalar(kind, Literal::Text(Arc::from(s)))
    }

    pub fn any_bool() -> Value {
        Value::scalar(ScalarKind::Bool)
    }

    pub fn any_int() -> Value {
        Value::scalar(ScalarKind::Int)
    }

    pub fn any_float() -> Value {
        Value::scalar(ScalarKind::Float)
    }

    pub fn any_string() -> Value {
        Value::scalar(ScalarKind::Str)
    }

    pub fn marker(capabilities: Capabilities) -> Value {
        Value::Marker(capabilities)
    }

    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Arc::new(ListValue::known(elements)))
    }

    pub fn list_of(element: Value) -> Value {
        Value::List(Arc::new(ListValue::of(element)))
    }

    pub fn tuple(elements: Vec<Value>) -> Value {
        Value::Tuple(Arc::new(ListValue::known(elements)))
    }

    pub fn tuple_of(element: Value) -> Value {
        Value::Tuple(Arc::new(ListValue::of(element)))
    }

    pub fn object(object: ObjectValue) -> Value {
        Value::Object(Arc::new(object))
    }

    pub fn any_object() -> Value {
        Value::Object(Arc::new(ObjectValue::open()))
    }

    pub fn record(record: ObjectValue) -> Value {
        Value::Record(Arc::new(record))
    }

    pub fn any_record() -> Value {
        Value::Record(Arc::new(ObjectValue::open()))
    }

    pub fn any_function() -> Value {
        Value::Function(Arc::new(FunctionValue::any()))
    }

    pub fn routine(result: Value) -> Value {
        Value::Routine(Arc::new(RoutineValue { result }))
    }

    pub fn pattern(pattern: Pattern) -> Value {
        Value::Pattern(Arc::new(pattern))
    }
}

// Queries
impl Value {
    pub fn is_any(&self) -> bool {
        matches!(self, Value::Any)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Value::Never)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn is_kind(&self, kind: ScalarKind) -> bool {
        self.as_scalar().is_some_and(|s| s.kind() == kind)
    }

    /// Members of a multivalue, or the value itself.
    pub fn possibilities(&self) -> &[Value] {
        match self {
            Value::Multi(multi) => multi.members(),
            other => std::slice::from_ref(other),
        }
    }

    /// Capabilities every runtime value approximated by `self` fulfils.
    pub fn capabilities(&self) -> Capabilities {
        use Capabilities as C;

        fn serializable_if<'a>(values: impl IntoIterator<Item = &'a Value>) -> Capabilities {
            let all = values
                .into_iter()
                .all(|v| v.capabilities().contains(Capabilities::SERIALIZABLE));
            if all {
                Capabilities::SERIALIZABLE
            } else {
                Capabilities::empty()
            }
        }

        match self {
            Value::Any | Value::Never => C::empty(),
            Value::Nil => C::SERIALIZABLE,
            Value::Scalar(scalar) => scalar.kind().capabilities(),
            Value::Marker(capabilities) => *capabilities,
            Value::List(list) => {
                C::ITERABLE | C::INDEXABLE | C::WATCHABLE | serializable_if(list.values())
            }
            Value::Tuple(tuple) => C::ITERABLE | C::INDEXABLE | serializable_if(tuple.values()),
            Value::Object(object) if object.entries.is_open() => C::ITERABLE | C::WATCHABLE,
            Value::Object(object) => C::ITERABLE | C::WATCHABLE | serializable_if(object.values()),
            Value::Record(record) if record.entries.is_open() => C::ITERABLE,
            Value::Record(record) => C::ITERABLE | serializable_if(record.values()),
            Value::Dictionary(dict) => C::ITERABLE | C::WATCHABLE | serializable_if(dict.values()),
            Value::KeyList(_) => C::ITERABLE | C::SERIALIZABLE,
            Value::Function(_) | Value::Native(_) => C::CALLABLE,
            Value::Routine(_) => C::WATCHABLE,
            Value::Pattern(_) => C::PATTERN | C::SERIALIZABLE,
            Value::Multi(multi) => multi
                .members()
                .iter()
                .map(Value::capabilities)
                .fold(C::all(), |acc, caps| acc & caps),
        }
    }

    /// Can a runtime value approximated by `self` be mutated in place?
    ///
    /// Exact-value patterns, records and tuples only hold immutable values.
    pub fn is_mutable(&self) -> bool {
        match self {
            Value::Any => true,
            Value::Never | Value::Nil => false,
            Value::Scalar(scalar) => scalar.kind().is_mutable(),
            Value::Marker(capabilities) => {
                !Capabilities::IMMUTABLE_ONLY.intersects(*capabilities)
            }
            Value::List(_)
            | Value::Object(_)
            | Value::Dictionary(_)
            | Value::Routine(_) => true,
            Value::Tuple(_)
            | Value::Record(_)
            | Value::KeyList(_)
            | Value::Function(_)
            | Value::Native(_)
            | Value::Pattern(_) => false,
            Value::Multi(multi) => multi.members().iter().any(Value::is_mutable),
        }
    }

    /// The maximally imprecise member of the same kind.
    #[must_use]
    pub fn widest_of_type(&self) -> Value {
        match self {
            Value::Any | Value::Never | Value::Nil | Value::Marker(_) => self.clone(),
            Value::Scalar(scalar) => Value::Scalar(scalar.widest()),
            Value::List(_) => Value::list_of(Value::Any),
            Value::Tuple(_) => Value::tuple_of(Value::Any),
            Value::Object(_) => Value::any_object(),
            Value::Record(_) => Value::any_record(),
            Value::Dictionary(_) => Value::Dictionary(Arc::new(DictionaryValue::any())),
            Value::KeyList(_) => Value::KeyList(Arc::new(KeyListValue { keys: Shape::Open })),
            Value::Function(_) | Value::Native(_) => Value::any_function(),
            Value::Routine(_) => Value::routine(Value::Any),
            Value::Pattern(_) => Value::Marker(Capabilities::PATTERN),
            Value::Multi(multi) => join(multi.members().iter().map(Value::widest_of_type)),
        }
    }

    /// Drops the payload of scalars; other kinds are returned unchanged.
    ///
    /// Elements stored into mutable containers go through this: they can be
    /// reassigned later, so only their kind is tracked.
    #[must_use]
    pub fn without_payload(&self) -> Value {
        match self {
            Value::Scalar(scalar) => Value::Scalar(scalar.widest()),
            Value::Multi(multi) => join(multi.members().iter().map(Value::without_payload)),
            other => other.clone(),
        }
    }

    /// Approximation of the elements produced by iterating over `self`.
    ///
    /// `None` when some possibility is not iterable.
    pub fn iteration_element(&self) -> Option<Value> {
        match self {
            Value::Any => Some(Value::Any),
            Value::Scalar(scalar) => match scalar.kind() {
                ScalarKind::Str => Some(Value::scalar(ScalarKind::Rune)),
                ScalarKind::ByteSlice => Some(Value::scalar(ScalarKind::Byte)),
                _ => None,
            },
            Value::Marker(capabilities) => {
                capabilities.contains(Capabilities::ITERABLE).then_some(Value::Any)
            }
            Value::List(list) | Value::Tuple(list) => Some(list.element()),
            Value::Object(object) | Value::Record(object) => Some(match object.entries {
                Shape::Open => Value::Any,
                Shape::Closed(_) if !object.exact || object.values().next().is_none() => {
                    Value::Any
                }
                Shape::Closed(_) => join(object.values().cloned()),
            }),
            Value::Dictionary(dict) => Some(dict.value_element()),
            Value::KeyList(_) => Some(Value::scalar(ScalarKind::PropertyName)),
            Value::Multi(multi) => {
                let elements: Option<Vec<Value>> =
                    multi.members().iter().map(Value::iteration_element).collect();
                elements.map(join)
            }
            Value::Never
            | Value::Nil
            | Value::Function(_)
            | Value::Native(_)
            | Value::Routine(_)
            | Value::Pattern(_) => None,
        }
    }

    /// Is every part of the value known, so that it maps to exactly one
    /// runtime value?
    pub fn is_concretizable(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Scalar(scalar) => scalar.has_value(),
            Value::List(list) | Value::Tuple(list) => list
                .known_elements()
                .is_some_and(|elements| elements.iter().all(Value::is_concretizable)),
            Value::Object(object) | Value::Record(object) => {
                object.exact
                    && object.optional.is_empty()
                    && object.entries.closed().is_some_and(|entries| {
                        entries.values().all(Value::is_concretizable)
                    })
            }
            Value::Dictionary(dict) => match dict.as_ref() {
                DictionaryValue::Known(entries) => entries
                    .values()
                    .all(|(k, v)| k.is_concretizable() && v.is_concretizable()),
                DictionaryValue::Of { .. } => false,
            },
            Value::KeyList(keys) => !keys.keys.is_open(),
            Value::Pattern(pattern) => pattern.is_concretizable(),
            Value::Any
            | Value::Never
            | Value::Marker(_)
            | Value::Function(_)
            | Value::Native(_)
            | Value::Routine(_)
            | Value::Multi(_) => false,
        }
    }
}
