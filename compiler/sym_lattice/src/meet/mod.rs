//! Value intersection.
//!
//! `meet(a, b)` approximates the runtime values approximated by both `a`
//! and `b`. It backs intersection patterns and narrowing by a pattern test.
//! `Never` means the intersection is empty.

use std::collections::BTreeMap;
use std::sync::Arc;

use sym_stack::ensure_sufficient_stack;

use crate::{join, Elements, ListValue, ObjectValue, Shape, Value};

/// Nesting bound for [`meet`]. Patterns nested deeper than this are
/// pathological and abort the analysis.
pub const MAX_MEET_DEPTH: u32 = 64;

/// # Panics
/// Panics when nesting exceeds [`MAX_MEET_DEPTH`].
pub fn meet(a: &Value, b: &Value) -> Value {
    meet_at(a, b, 0)
}

fn meet_at(a: &Value, b: &Value, depth: u32) -> Value {
    if depth > MAX_MEET_DEPTH {
        exceeded(depth);
    }
    ensure_sufficient_stack(|| meet_step(a, b, depth + 1))
}

#[cold]
#[inline(never)]
fn exceeded(depth: u32) -> ! {
    panic!("value intersection depth {depth} exceeds {MAX_MEET_DEPTH}")
}

fn meet_step(a: &Value, b: &Value, depth: u32) -> Value {
    match (a, b) {
        (Value::Never, _) | (_, Value::Never) => Value::Never,
        (Value::Any, other) | (other, Value::Any) => other.clone(),
        (Value::Multi(multi), other) | (other, Value::Multi(multi)) => {
            join(multi.members().iter().map(|m| meet_at(m, other, depth)))
        }
        _ if a.test(b) => b.clone(),
        _ if b.test(a) => a.clone(),
        (Value::Marker(x), Value::Marker(y)) => Value::Marker(*x | *y),
        (Value::Object(x), Value::Object(y)) => {
            meet_fields(x, y, depth).map_or(Value::Never, Value::object)
        }
        (Value::Record(x), Value::Record(y)) => {
            meet_fields(x, y, depth).map_or(Value::Never, Value::record)
        }
        (Value::List(x), Value::List(y)) => meet_elements(x, y, depth)
            .map_or(Value::Never, |list| Value::List(Arc::new(list))),
        (Value::Tuple(x), Value::Tuple(y)) => meet_elements(x, y, depth)
            .map_or(Value::Never, |tuple| Value::Tuple(Arc::new(tuple))),
        _ => Value::Never,
    }
}

fn meet_elements(a: &ListValue, b: &ListValue, depth: u32) -> Option<ListValue> {
    let elements = match (&a.elements, &b.elements) {
        (Elements::Of(x), Elements::Of(y)) => Elements::Of(meet_at(x, y, depth)),
        (Elements::Known(known), Elements::Of(of)) | (Elements::Of(of), Elements::Known(known)) => {
            let met: Vec<Value> = known.iter().map(|k| meet_at(k, of, depth)).collect();
            if met.iter().any(Value::is_never) {
                return None;
            }
            Elements::Known(met)
        }
        (Elements::Known(x), Elements::Known(y)) => {
            if x.len() != y.len() {
                return None;
            }
            let met: Vec<Value> = x.iter().zip(y).map(|(l, r)| meet_at(l, r, depth)).collect();
            if met.iter().any(Value::is_never) {
                return None;
            }
            Elements::Known(met)
        }
    };
    Some(ListValue { elements })
}

fn meet_fields(a: &ObjectValue, b: &ObjectValue, depth: u32) -> Option<ObjectValue> {
    let (left, right) = match (&a.entries, &b.entries) {
        (Shape::Open, _) => return Some(b.clone()),
        (_, Shape::Open) => return Some(a.clone()),
        (Shape::Closed(left), Shape::Closed(right)) => (left, right),
    };

    let mut result = ObjectValue {
        entries: Shape::Open,
        optional: Default::default(),
        exact: a.exact || b.exact,
        static_types: a.static_types.clone(),
    };
    for (key, pattern) in &b.static_types {
        result
            .static_types
            .entry(key.clone())
            .or_insert_with(|| pattern.clone());
    }

    let mut entries = BTreeMap::new();
    for (key, value) in left {
        match right.get(key) {
            Some(other) => {
                let both_optional = a.is_optional(key) && b.is_optional(key);
                let met = meet_at(value, other, depth);
                if met.is_never() {
                    if !both_optional {
                        return None;
                    }
                    // The field must be absent.
                    continue;
                }
                if both_optional {
                    result.optional.insert(key.clone());
                }
                entries.insert(key.clone(), met);
            }
            None => {
                if !keep_one_sided(key, a, b, &mut result)? {
                    continue;
                }
                entries.insert(key.clone(), value.clone());
            }
        }
    }
    for (key, value) in right {
        if left.contains_key(key) {
            continue;
        }
        if keep_one_sided(key, b, a, &mut result)? {
            entries.insert(key.clone(), value.clone());
        }
    }

    result.entries = Shape::Closed(entries);
    Some(result)
}

/// Field present only in `owner`. `None` when `other` forbids a required
/// field, `Some(false)` when the field must be dropped.
fn keep_one_sided(
    key: &str,
    owner: &ObjectValue,
    other: &ObjectValue,
    result: &mut ObjectValue,
) -> Option<bool> {
    let optional = owner.is_optional(key);
    if other.exact {
        return if optional { Some(false) } else { None };
    }
    if optional {
        result.optional.insert(key.to_string());
    }
    Some(true)
}

#[cfg(test)]
mod tests;
