use pretty_assertions::assert_eq;

use crate::{join, remove_possible_value, ObjectValue, Value};

#[test]
fn empty_join_is_never() {
    assert_eq!(join(Vec::<Value>::new()), Value::Never);
    assert_eq!(join([Value::Never, Value::Never]), Value::Never);
}

#[test]
fn single_member_collapses() {
    assert_eq!(join([Value::int(1)]), Value::int(1));
    assert_eq!(join([Value::int(1), Value::Never, Value::int(1)]), Value::int(1));
}

#[test]
fn covered_values_are_skipped() {
    assert_eq!(join([Value::any_int(), Value::int(1)]), Value::any_int());
    assert_eq!(join([Value::int(1), Value::any_int()]), Value::any_int());
}

#[test]
fn wider_value_replaces_every_covered_member() {
    let joined = join([Value::int(1), Value::string("a"), Value::int(2), Value::Nil]);
    assert_eq!(joined.possibilities().len(), 4);

    let widened = join([joined, Value::any_int()]);
    assert_eq!(
        widened.possibilities(),
        &[Value::any_int(), Value::string("a"), Value::Nil]
    );
}

#[test]
fn nested_multivalues_are_flattened() {
    let inner = join([Value::int(1), Value::Nil]);
    let outer = join([inner, Value::string("s")]);
    assert_eq!(outer.possibilities().len(), 3);
    assert!(outer
        .possibilities()
        .iter()
        .all(|member| !matches!(member, Value::Multi(_))));
}

#[test]
fn objects_sharing_fields_merge() {
    let a = Value::object(ObjectValue::exact([
        ("id", Value::any_int()),
        ("name", Value::any_string()),
    ]));
    let b = Value::object(ObjectValue::exact([("id", Value::any_int()), ("age", Value::any_int())]));

    let Value::Object(merged) = join([a, b]) else {
        panic!("expected a merged object");
    };
    assert!(!merged.exact);
    assert_eq!(merged.get("id"), Some(&Value::any_int()));
    assert_eq!(merged.len(), Some(1));
}

#[test]
fn merged_field_optional_if_optional_in_either() {
    let a = Value::object(ObjectValue::exact([("id", Value::int(1))]).with_optional("id"));
    let b = Value::object(ObjectValue::exact([("id", Value::string("x")), ("n", Value::Nil)]));

    let Value::Object(merged) = join([a, b]) else {
        panic!("expected a merged object");
    };
    assert!(merged.is_optional("id"));
    assert_eq!(merged.get("id"), Some(&join([Value::int(1), Value::string("x")])));
}

#[test]
fn objects_without_common_fields_stay_apart() {
    let a = Value::object(ObjectValue::exact([("a", Value::any_int())]));
    let b = Value::object(ObjectValue::exact([("b", Value::any_int())]));
    assert_eq!(join([a, b]).possibilities().len(), 2);
}

#[test]
fn join_subsumes_inputs() {
    let inputs = [Value::int(1), Value::list_of(Value::Any), Value::Nil];
    let joined = join(inputs.clone());
    for input in &inputs {
        assert!(joined.test(input), "{joined} should subsume {input}");
    }
}

#[test]
fn removing_possibilities() {
    let value = join([Value::Nil, Value::any_int(), Value::any_string()]);
    assert_eq!(
        remove_possible_value(&value, &Value::Nil),
        join([Value::any_int(), Value::any_string()])
    );
    assert_eq!(remove_possible_value(&Value::Nil, &Value::Nil), Value::Never);
    assert_eq!(remove_possible_value(&Value::any_int(), &Value::int(1)), Value::any_int());
}
