//! Object, record, list, tuple and function patterns.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Elements, FunctionValue, ListValue, ObjectValue, Shape, Signature, TestCx, Value};

use super::Pattern;

/// Inter-field constraint: when the owning field is present, `required`
/// fields must be present too and the whole value must match `pattern`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Dependency {
    pub required: BTreeSet<String>,
    pub pattern: Option<Pattern>,
}

/// Fields of an object or record pattern.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ShapePattern {
    pub fields: Shape<BTreeMap<String, Pattern>>,
    pub optional: BTreeSet<String>,
    /// No fields beyond `fields` are permitted.
    pub exact: bool,
    pub dependencies: BTreeMap<String, Dependency>,
}

impl ShapePattern {
    pub fn open() -> Self {
        ShapePattern {
            fields: Shape::Open,
            optional: BTreeSet::new(),
            exact: false,
            dependencies: BTreeMap::new(),
        }
    }

    pub fn exact<K: Into<String>>(fields: impl IntoIterator<Item = (K, Pattern)>) -> Self {
        ShapePattern {
            fields: Shape::Closed(fields.into_iter().map(|(k, p)| (k.into(), p)).collect()),
            optional: BTreeSet::new(),
            exact: true,
            dependencies: BTreeMap::new(),
        }
    }

    pub fn inexact<K: Into<String>>(fields: impl IntoIterator<Item = (K, Pattern)>) -> Self {
        ShapePattern {
            exact: false,
            ..Self::exact(fields)
        }
    }

    #[must_use]
    pub fn with_optional(mut self, key: impl Into<String>) -> Self {
        self.optional.insert(key.into());
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, key: impl Into<String>, dependency: Dependency) -> Self {
        self.dependencies.insert(key.into(), dependency);
        self
    }

    pub fn is_optional(&self, key: &str) -> bool {
        self.optional.contains(key)
    }

    /// `whole` is the value `object` was taken from; dependency patterns
    /// are matched against it.
    pub(crate) fn test_fields(&self, whole: &Value, object: &ObjectValue, cx: TestCx<'_>) -> bool {
        let Shape::Closed(fields) = &self.fields else {
            return true;
        };
        let Shape::Closed(entries) = &object.entries else {
            return false;
        };

        if self.exact {
            if !object.exact || entries.keys().any(|key| !fields.contains_key(key)) {
                return false;
            }
            if self.optional.is_empty() && entries.len() != fields.len() {
                return false;
            }
        }

        let fields_match = fields.iter().all(|(key, pattern)| match entries.get(key) {
            Some(value) => {
                pattern.test_value_in(value, cx)
                    && (!object.is_optional(key) || self.is_optional(key))
            }
            // An inexact value may still carry `key`, with any value.
            None => {
                self.is_optional(key) && (object.exact || pattern.test_value_in(&Value::Any, cx))
            }
        });
        if !fields_match {
            return false;
        }

        self.dependencies.iter().all(|(key, dependency)| {
            let may_be_present = entries.contains_key(key) || !object.exact;
            if !may_be_present {
                return true;
            }
            let companions_present = dependency
                .required
                .iter()
                .all(|required| entries.contains_key(required) && !object.is_optional(required));
            companions_present
                && dependency
                    .pattern
                    .as_ref()
                    .map_or(true, |pattern| pattern.test_value_in(whole, cx))
        })
    }

    /// Value approximation; objects keep the field patterns as static types.
    pub(crate) fn symbolic_fields(&self, keep_static_types: bool) -> ObjectValue {
        let Shape::Closed(fields) = &self.fields else {
            return ObjectValue::open();
        };
        ObjectValue {
            entries: Shape::Closed(
                fields
                    .iter()
                    .map(|(key, pattern)| (key.clone(), pattern.symbolic_value()))
                    .collect(),
            ),
            optional: self.optional.clone(),
            exact: self.exact,
            static_types: if keep_static_types {
                fields.clone()
            } else {
                BTreeMap::new()
            },
        }
    }
}

/// Elements of a list or tuple pattern.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SequencePattern {
    Known(Vec<Pattern>),
    /// Any length, every element matching.
    Of(Pattern),
}

impl SequencePattern {
    pub(crate) fn test_elements(&self, list: &ListValue, cx: TestCx<'_>) -> bool {
        match (self, &list.elements) {
            (SequencePattern::Of(pattern), Elements::Of(element)) => {
                pattern.test_value_in(element, cx)
            }
            (SequencePattern::Of(pattern), Elements::Known(elements)) => {
                elements.iter().all(|e| pattern.test_value_in(e, cx))
            }
            (SequencePattern::Known(_), Elements::Of(_)) => false,
            (SequencePattern::Known(patterns), Elements::Known(elements)) => {
                patterns.len() == elements.len()
                    && patterns
                        .iter()
                        .zip(elements)
                        .all(|(p, e)| p.test_value_in(e, cx))
            }
        }
    }

    pub(crate) fn symbolic_elements(&self) -> ListValue {
        match self {
            SequencePattern::Known(patterns) => {
                ListValue::known(patterns.iter().map(Pattern::symbolic_value).collect())
            }
            SequencePattern::Of(pattern) => ListValue::of(pattern.symbolic_value()),
        }
    }

    pub(crate) fn patterns(&self) -> &[Pattern] {
        match self {
            SequencePattern::Known(patterns) => patterns,
            SequencePattern::Of(pattern) => std::slice::from_ref(pattern),
        }
    }
}

/// Callable shape: parameter patterns and an optional result pattern.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionPattern {
    pub params: Vec<Pattern>,
    pub result: Option<Pattern>,
}

impl FunctionPattern {
    pub(crate) fn test_value_in(&self, value: &Value, cx: TestCx<'_>) -> bool {
        let (params, result) = match value {
            Value::Function(function) => match function.signature() {
                Some(signature) => (signature.params.as_slice(), &signature.result),
                None => return false,
            },
            Value::Native(native) if native.variadic.is_none() => {
                (native.params.as_slice(), &native.result)
            }
            _ => return false,
        };

        // The callable must accept everything callers may pass.
        params.len() == self.params.len()
            && params
                .iter()
                .zip(&self.params)
                .all(|(accepted, passed)| accepted.test_in(&passed.symbolic_value(), cx))
            && self
                .result
                .as_ref()
                .map_or(true, |pattern| pattern.test_value_in(result, cx))
    }

    pub(crate) fn symbolic_function(&self) -> FunctionValue {
        let params: Vec<Value> = self.params.iter().map(Pattern::symbolic_value).collect();
        let result = self
            .result
            .as_ref()
            .map_or(Value::Any, Pattern::symbolic_value);
        let mut signature = Signature::new(params, result);
        signature.declared_result = self.result.is_some();
        FunctionValue {
            node: None,
            signature: Shape::Closed(signature),
        }
    }
}
