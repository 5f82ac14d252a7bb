use thiserror::Error;

use crate::{
    DictionaryValue, Elements, ListValue, Literal, LocatorMatcher, ObjectValue, Pattern,
    ScalarKind, SequencePattern, Shape, ShapePattern, Value,
};

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ConcretizeError {
    #[error("{0} has no single runtime counterpart")]
    NotConcretizable(String),
}

/// Factories for the runtime's values and patterns.
///
/// Implemented by the embedding runtime; the lattice calls the factories
/// while walking a fully known value.
pub trait ExternalData: LocatorMatcher {
    type Runtime;

    fn nil(&self) -> Self::Runtime;
    fn scalar(&self, kind: ScalarKind, literal: &Literal) -> Self::Runtime;
    fn list(&self, elements: Vec<Self::Runtime>) -> Self::Runtime;
    fn tuple(&self, elements: Vec<Self::Runtime>) -> Self::Runtime;
    fn object(&self, entries: Vec<(String, Self::Runtime)>) -> Self::Runtime;
    fn record(&self, entries: Vec<(String, Self::Runtime)>) -> Self::Runtime;
    fn dictionary(&self, entries: Vec<(Self::Runtime, Self::Runtime)>) -> Self::Runtime;
    fn key_list(&self, keys: Vec<String>) -> Self::Runtime;

    fn any_pattern(&self) -> Self::Runtime;
    /// Pattern matching the values of `ty` (nil, an unknown scalar or a
    /// capability marker).
    fn type_pattern(&self, ty: &Value) -> Self::Runtime;
    fn exact_value_pattern(&self, value: Self::Runtime) -> Self::Runtime;
    fn union_pattern(&self, cases: Vec<Self::Runtime>, disjoint: bool) -> Self::Runtime;
    fn intersection_pattern(&self, cases: Vec<Self::Runtime>) -> Self::Runtime;
    fn difference_pattern(&self, base: Self::Runtime, removed: Self::Runtime) -> Self::Runtime;
    /// Integers from `start` to `end`, both included.
    fn int_range_pattern(&self, start: i64, end: i64) -> Self::Runtime;
    /// `fields` carries `(key, pattern, optional)`; an open shape has none.
    fn object_pattern(&self, fields: Vec<(String, Self::Runtime, bool)>, exact: bool)
        -> Self::Runtime;
    fn record_pattern(&self, fields: Vec<(String, Self::Runtime, bool)>, exact: bool)
        -> Self::Runtime;
    fn list_pattern(&self, elements: Vec<Self::Runtime>) -> Self::Runtime;
    fn list_of_pattern(&self, element: Self::Runtime) -> Self::Runtime;
    fn tuple_pattern(&self, elements: Vec<Self::Runtime>) -> Self::Runtime;
    fn tuple_of_pattern(&self, element: Self::Runtime) -> Self::Runtime;
    fn optional_pattern(&self, inner: Self::Runtime) -> Self::Runtime;
    fn path_pattern(&self, glob: Option<&str>) -> Self::Runtime;
    fn url_pattern(&self, prefix: Option<&str>) -> Self::Runtime;
    fn host_pattern(&self, host: Option<&str>) -> Self::Runtime;
}

#[cold]
fn not_concretizable(what: &impl std::fmt::Display) -> ConcretizeError {
    ConcretizeError::NotConcretizable(what.to_string())
}

fn known_elements<'a>(list: &'a ListValue, whole: &Value) -> Result<&'a [Value], ConcretizeError> {
    match &list.elements {
        Elements::Known(elements) => Ok(elements),
        Elements::Of(_) => Err(not_concretizable(whole)),
    }
}

fn concretize_entries<E: ExternalData + ?Sized>(
    object: &ObjectValue,
    whole: &Value,
    external: &E,
) -> Result<Vec<(String, E::Runtime)>, ConcretizeError> {
    let Shape::Closed(entries) = &object.entries else {
        return Err(not_concretizable(whole));
    };
    if !object.exact || !object.optional.is_empty() {
        return Err(not_concretizable(whole));
    }
    entries
        .iter()
        .map(|(key, value)| Ok((key.clone(), concretize(value, external)?)))
        .collect()
}

/// Builds the single runtime value `value` stands for.
///
/// # Errors
/// Fails when some part of `value` is not fully known.
pub fn concretize<E: ExternalData + ?Sized>(
    value: &Value,
    external: &E,
) -> Result<E::Runtime, ConcretizeError> {
    match value {
        Value::Nil => Ok(external.nil()),
        Value::Scalar(scalar) => match scalar.literal() {
            Some(literal) => Ok(external.scalar(scalar.kind(), literal)),
            None => Err(not_concretizable(value)),
        },
        Value::List(list) => {
            let elements = known_elements(list, value)?;
            let elements = elements
                .iter()
                .map(|e| concretize(e, external))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(external.list(elements))
        }
        Value::Tuple(tuple) => {
            let elements = known_elements(tuple, value)?;
            let elements = elements
                .iter()
                .map(|e| concretize(e, external))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(external.tuple(elements))
        }
        Value::Object(object) => Ok(external.object(concretize_entries(object, value, external)?)),
        Value::Record(record) => Ok(external.record(concretize_entries(record, value, external)?)),
        Value::Dictionary(dict) => match dict.as_ref() {
            DictionaryValue::Known(entries) => {
                let entries = entries
                    .values()
                    .map(|(k, v)| Ok((concretize(k, external)?, concretize(v, external)?)))
                    .collect::<Result<Vec<_>, ConcretizeError>>()?;
                Ok(external.dictionary(entries))
            }
            DictionaryValue::Of { .. } => Err(not_concretizable(value)),
        },
        Value::KeyList(keys) => match &keys.keys {
            Shape::Closed(keys) => Ok(external.key_list(keys.iter().cloned().collect())),
            Shape::Open => Err(not_concretizable(value)),
        },
        Value::Pattern(pattern) => concretize_pattern(pattern, external),
        Value::Any
        | Value::Never
        | Value::Marker(_)
        | Value::Function(_)
        | Value::Native(_)
        | Value::Routine(_)
        | Value::Multi(_) => Err(not_concretizable(value)),
    }
}

fn concretize_all<E: ExternalData + ?Sized>(
    patterns: &[Pattern],
    external: &E,
) -> Result<Vec<E::Runtime>, ConcretizeError> {
    patterns.iter().map(|p| concretize_pattern(p, external)).collect()
}

fn concretize_fields<E: ExternalData + ?Sized>(
    shape: &ShapePattern,
    whole: &Pattern,
    external: &E,
) -> Result<(Vec<(String, E::Runtime, bool)>, bool), ConcretizeError> {
    if !shape.dependencies.is_empty() {
        return Err(not_concretizable(whole));
    }
    let Shape::Closed(fields) = &shape.fields else {
        return Ok((Vec::new(), false));
    };
    let fields = fields
        .iter()
        .map(|(key, pattern)| {
            let runtime = concretize_pattern(pattern, external)?;
            Ok((key.clone(), runtime, shape.is_optional(key)))
        })
        .collect::<Result<Vec<_>, ConcretizeError>>()?;
    Ok((fields, shape.exact))
}

/// Builds the runtime pattern `pattern` stands for.
///
/// # Errors
/// Fails on function patterns, dependency constraints and exact values that
/// are not fully known.
pub fn concretize_pattern<E: ExternalData + ?Sized>(
    pattern: &Pattern,
    external: &E,
) -> Result<E::Runtime, ConcretizeError> {
    match pattern {
        Pattern::Any => Ok(external.any_pattern()),
        Pattern::Type(ty) => match ty {
            Value::Nil | Value::Marker(_) => Ok(external.type_pattern(ty)),
            Value::Scalar(scalar) if !scalar.has_value() => Ok(external.type_pattern(ty)),
            _ => Err(not_concretizable(pattern)),
        },
        Pattern::Exact(value) => Ok(external.exact_value_pattern(concretize(value, external)?)),
        Pattern::Union(union) => Ok(external.union_pattern(
            concretize_all(&union.cases, external)?,
            union.disjoint,
        )),
        Pattern::Intersection(inter) => {
            Ok(external.intersection_pattern(concretize_all(&inter.cases, external)?))
        }
        Pattern::Difference(difference) => Ok(external.difference_pattern(
            concretize_pattern(&difference.base, external)?,
            concretize_pattern(&difference.removed, external)?,
        )),
        Pattern::IntRange { start, end } => Ok(external.int_range_pattern(*start, *end)),
        Pattern::Object(shape) => {
            let (fields, exact) = concretize_fields(shape, pattern, external)?;
            Ok(external.object_pattern(fields, exact))
        }
        Pattern::Record(shape) => {
            let (fields, exact) = concretize_fields(shape, pattern, external)?;
            Ok(external.record_pattern(fields, exact))
        }
        Pattern::List(seq) => match seq.as_ref() {
            SequencePattern::Known(elements) => {
                Ok(external.list_pattern(concretize_all(elements, external)?))
            }
            SequencePattern::Of(element) => {
                Ok(external.list_of_pattern(concretize_pattern(element, external)?))
            }
        },
        Pattern::Tuple(seq) => match seq.as_ref() {
            SequencePattern::Known(elements) => {
                Ok(external.tuple_pattern(concretize_all(elements, external)?))
            }
            SequencePattern::Of(element) => {
                Ok(external.tuple_of_pattern(concretize_pattern(element, external)?))
            }
        },
        Pattern::Optional(inner) => {
            Ok(external.optional_pattern(concretize_pattern(inner, external)?))
        }
        Pattern::Path(glob) => Ok(external.path_pattern(glob.as_deref())),
        Pattern::Url(prefix) => Ok(external.url_pattern(prefix.as_deref())),
        Pattern::Host(host) => Ok(external.host_pattern(host.as_deref())),
        Pattern::Function(_) => Err(not_concretizable(pattern)),
    }
}
