//! Structural containers.
//!
//! Lists and tuples share [`ListValue`]; objects and records share
//! [`ObjectValue`]. The enclosing `Value` variant decides mutability.

use std::collections::{BTreeMap, BTreeSet};

use crate::{join, Pattern, TestCx, Value};

/// Explicit "any shape of this kind" marker.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Shape<T> {
    /// Any shape of the enclosing kind.
    Open,
    Closed(T),
}

impl<T> Shape<T> {
    pub fn is_open(&self) -> bool {
        matches!(self, Shape::Open)
    }

    pub fn closed(&self) -> Option<&T> {
        match self {
            Shape::Open => None,
            Shape::Closed(inner) => Some(inner),
        }
    }
}

/// Elements of a sequence.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Elements {
    /// Length and each element are known.
    Known(Vec<Value>),
    /// Any length; every element is approximated by this value.
    Of(Value),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ListValue {
    pub elements: Elements,
}

impl ListValue {
    pub fn known(elements: Vec<Value>) -> Self {
        ListValue {
            elements: Elements::Known(elements),
        }
    }

    pub fn of(element: Value) -> Self {
        ListValue {
            elements: Elements::Of(element),
        }
    }

    /// Approximation of any single element: the join of known elements.
    ///
    /// An empty known sequence says nothing about its elements: `Any`.
    pub fn element(&self) -> Value {
        match &self.elements {
            Elements::Known(values) if values.is_empty() => Value::Any,
            Elements::Known(values) => join(values.iter().cloned()),
            Elements::Of(element) => element.clone(),
        }
    }

    pub fn known_elements(&self) -> Option<&[Value]> {
        match &self.elements {
            Elements::Known(values) => Some(values),
            Elements::Of(_) => None,
        }
    }

    pub(crate) fn test_in(&self, other: &ListValue, cx: TestCx<'_>) -> bool {
        match (&self.elements, &other.elements) {
            (Elements::Of(mine), Elements::Of(theirs)) => mine.test_in(theirs, cx),
            (Elements::Of(mine), Elements::Known(theirs)) => {
                theirs.iter().all(|e| mine.test_in(e, cx))
            }
            (Elements::Known(_), Elements::Of(_)) => false,
            (Elements::Known(mine), Elements::Known(theirs)) => {
                mine.len() == theirs.len()
                    && mine.iter().zip(theirs).all(|(m, t)| m.test_in(t, cx))
            }
        }
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        let (known, of) = match &self.elements {
            Elements::Known(values) => (values.as_slice(), None),
            Elements::Of(element) => (&[][..], Some(element)),
        };
        known.iter().chain(of)
    }
}

/// Fields of an object or record.
///
/// `exact` means no fields beyond `entries` exist. `static_types` constrain
/// later property assignments on objects and are empty for records.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjectValue {
    pub entries: Shape<BTreeMap<String, Value>>,
    pub optional: BTreeSet<String>,
    pub exact: bool,
    pub static_types: BTreeMap<String, Pattern>,
}

impl ObjectValue {
    pub fn open() -> Self {
        ObjectValue {
            entries: Shape::Open,
            optional: BTreeSet::new(),
            exact: false,
            static_types: BTreeMap::new(),
        }
    }

    pub fn exact<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        ObjectValue {
            entries: Shape::Closed(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            optional: BTreeSet::new(),
            exact: true,
            static_types: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn inexact(mut self) -> Self {
        self.exact = false;
        self
    }

    #[must_use]
    pub fn with_optional(mut self, key: impl Into<String>) -> Self {
        self.optional.insert(key.into());
        self
    }

    #[must_use]
    pub fn with_static_type(mut self, key: impl Into<String>, pattern: Pattern) -> Self {
        self.static_types.insert(key.into(), pattern);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.closed().and_then(|entries| entries.get(key))
    }

    pub fn is_optional(&self, key: &str) -> bool {
        self.optional.contains(key)
    }

    pub fn len(&self) -> Option<usize> {
        self.entries.closed().map(BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub(crate) fn test_in(&self, other: &ObjectValue, cx: TestCx<'_>) -> bool {
        let Shape::Closed(mine) = &self.entries else {
            return true;
        };
        let Shape::Closed(theirs) = &other.entries else {
            return false;
        };

        if self.exact && (!other.exact || theirs.keys().any(|k| !mine.contains_key(k))) {
            return false;
        }

        mine.iter().all(|(key, value)| match theirs.get(key) {
            Some(their_value) => {
                value.test_in(their_value, cx)
                    && (!other.is_optional(key) || self.is_optional(key))
            }
            // An inexact value may still carry `key`, with any value.
            None => self.is_optional(key) && (other.exact || value.test_in(&Value::Any, cx)),
        })
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.closed().into_iter().flat_map(BTreeMap::values)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DictionaryValue {
    /// Keyed by the rendered key.
    Known(BTreeMap<String, (Value, Value)>),
    Of { key: Value, value: Value },
}

impl DictionaryValue {
    pub fn any() -> Self {
        DictionaryValue::Of {
            key: Value::Any,
            value: Value::Any,
        }
    }

    pub fn value_element(&self) -> Value {
        match self {
            DictionaryValue::Known(entries) => join(entries.values().map(|(_, v)| v.clone())),
            DictionaryValue::Of { value, .. } => value.clone(),
        }
    }

    pub(crate) fn test_in(&self, other: &DictionaryValue, cx: TestCx<'_>) -> bool {
        match (self, other) {
            (DictionaryValue::Of { key, value }, DictionaryValue::Of { key: k, value: v }) => {
                key.test_in(k, cx) && value.test_in(v, cx)
            }
            (DictionaryValue::Of { key, value }, DictionaryValue::Known(entries)) => entries
                .values()
                .all(|(k, v)| key.test_in(k, cx) && value.test_in(v, cx)),
            (DictionaryValue::Known(_), DictionaryValue::Of { .. }) => false,
            (DictionaryValue::Known(mine), DictionaryValue::Known(theirs)) => {
                mine.len() == theirs.len()
                    && mine.iter().all(|(repr, (_, value))| {
                        theirs
                            .get(repr)
                            .is_some_and(|(_, their_value)| value.test_in(their_value, cx))
                    })
            }
        }
    }

    pub(crate) fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            DictionaryValue::Known(entries) => {
                Box::new(entries.values().flat_map(|(k, v)| [k, v]))
            }
            DictionaryValue::Of { key, value } => Box::new([key, value].into_iter()),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyListValue {
    pub keys: Shape<BTreeSet<String>>,
}

impl KeyListValue {
    pub(crate) fn test(&self, other: &KeyListValue) -> bool {
        match (&self.keys, &other.keys) {
            (Shape::Open, _) => true,
            (Shape::Closed(_), Shape::Open) => false,
            (Shape::Closed(mine), Shape::Closed(theirs)) => mine == theirs,
        }
    }
}
