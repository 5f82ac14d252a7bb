//! Multivalues and the join that builds them.
//!
//! [`join`] is the merge point of every control-flow construct: each branch
//! contributes one value and the result approximates all of them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::{ObjectValue, Shape, Value};

/// "Exactly one of these, unknown which."
///
/// Invariants: at least two members, no member is itself a multivalue, no
/// member subsumes another. Only [`join`] builds one.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Multivalue(Arc<[Value]>);

impl Multivalue {
    #[inline]
    pub fn members(&self) -> &[Value] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a multivalue has at least two members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

type Members = SmallVec<[Value; 4]>;

/// Combine values from divergent paths.
///
/// Inputs are flattened and `Never` is dropped. A value already covered by
/// a member is skipped; a value covering members replaces the first of them
/// and removes the rest. Objects (or records) sharing at least one field are
/// merged into one inexact shape over the common fields. One remaining
/// member is returned as is; none yields `Never`.
pub fn join(values: impl IntoIterator<Item = Value>) -> Value {
    let mut members = Members::new();
    for value in values {
        match value {
            Value::Multi(multi) => {
                for member in multi.members() {
                    absorb(&mut members, member.clone());
                }
            }
            Value::Never => {}
            other => absorb(&mut members, other),
        }
    }

    match members.len() {
        0 => Value::Never,
        1 => members.swap_remove(0),
        _ => Value::Multi(Multivalue(members.into_vec().into())),
    }
}

fn absorb(members: &mut Members, value: Value) {
    if members.iter().any(|m| m.test(&value)) {
        return;
    }

    if let Some(slot) = members.iter().position(|m| value.test(m)) {
        members[slot] = value;
        remove_covered_by(members, slot);
        return;
    }

    // The merged shape is wider than both sides; it may now be covered by,
    // cover, or merge with other members.
    for slot in 0..members.len() {
        if let Some(merged) = merge_shapes(&members[slot], &value) {
            members.remove(slot);
            absorb(members, merged);
            return;
        }
    }

    members.push(value);
}

/// Drop every other member that `members[slot]` subsumes.
fn remove_covered_by(members: &mut Members, slot: usize) {
    let keeper = members[slot].clone();
    let mut index = 0;
    members.retain(|member| {
        let keep = index == slot || !keeper.test(member);
        index += 1;
        keep
    });
}

/// Merge same-kind structural shapes that share fields.
fn merge_shapes(a: &Value, b: &Value) -> Option<Value> {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => merge_objects(x, y).map(Value::object),
        (Value::Record(x), Value::Record(y)) => merge_objects(x, y).map(Value::record),
        _ => None,
    }
}

fn merge_objects(a: &ObjectValue, b: &ObjectValue) -> Option<ObjectValue> {
    let (Shape::Closed(left), Shape::Closed(right)) = (&a.entries, &b.entries) else {
        return None;
    };

    let common: BTreeMap<String, Value> = left
        .iter()
        .filter_map(|(key, value)| {
            right
                .get(key)
                .map(|other| (key.clone(), join([value.clone(), other.clone()])))
        })
        .collect();
    if common.is_empty() {
        return None;
    }

    let optional: BTreeSet<String> = common
        .keys()
        .filter(|key| a.is_optional(key) || b.is_optional(key))
        .cloned()
        .collect();
    let static_types = a
        .static_types
        .iter()
        .filter(|(key, pattern)| common.contains_key(*key) && b.static_types.get(*key) == Some(*pattern))
        .map(|(key, pattern)| (key.clone(), pattern.clone()))
        .collect();

    Some(ObjectValue {
        entries: Shape::Closed(common),
        optional,
        exact: false,
        static_types,
    })
}

/// Remove the possibilities of `value` that `removed` subsumes.
///
/// Used for narrowing: the consequent of `if x` removes `nil`, the
/// alternate of `if x match %p` removes what `%p` matches. Returns `Never`
/// when nothing is left.
pub fn remove_possible_value(value: &Value, removed: &Value) -> Value {
    join(
        value
            .possibilities()
            .iter()
            .filter(|possibility| !removed.test(possibility))
            .cloned(),
    )
}

#[cfg(test)]
mod tests;
