use pretty_assertions::assert_eq;

use crate::{join, meet, Capabilities, ObjectValue, Value};

#[test]
fn narrower_side_wins() {
    assert_eq!(meet(&Value::any_int(), &Value::int(3)), Value::int(3));
    assert_eq!(meet(&Value::int(3), &Value::Any), Value::int(3));
    assert_eq!(meet(&Value::Never, &Value::Any), Value::Never);
}

#[test]
fn disjoint_kinds_meet_at_never() {
    assert_eq!(meet(&Value::any_int(), &Value::any_string()), Value::Never);
    assert_eq!(meet(&Value::int(1), &Value::int(2)), Value::Never);
}

#[test]
fn multivalues_distribute() {
    let value = join([Value::Nil, Value::any_int(), Value::any_string()]);
    assert_eq!(
        meet(&value, &Value::marker(Capabilities::NUMERIC)),
        Value::any_int()
    );
}

#[test]
fn markers_combine() {
    let met = meet(
        &Value::marker(Capabilities::ITERABLE),
        &Value::marker(Capabilities::SERIALIZABLE),
    );
    assert_eq!(met, Value::marker(Capabilities::ITERABLE | Capabilities::SERIALIZABLE));
}

#[test]
fn objects_combine_fields() {
    let a = Value::object(ObjectValue::exact([("a", Value::any_int())]).inexact());
    let b = Value::object(ObjectValue::exact([("b", Value::any_string())]).inexact());

    let Value::Object(met) = meet(&a, &b) else {
        panic!("expected an object");
    };
    assert_eq!(met.get("a"), Some(&Value::any_int()));
    assert_eq!(met.get("b"), Some(&Value::any_string()));
    assert!(!met.exact);
}

#[test]
fn exact_object_forbids_required_fields_of_the_other() {
    let a = Value::object(ObjectValue::exact([("a", Value::any_int())]));
    let b = Value::object(ObjectValue::exact([("b", Value::any_int())]).inexact());
    assert_eq!(meet(&a, &b), Value::Never);

    let optional_b = Value::object(
        ObjectValue::exact([("b", Value::any_int())])
            .inexact()
            .with_optional("b"),
    );
    let Value::Object(met) = meet(&a, &optional_b) else {
        panic!("expected an object");
    };
    assert_eq!(met.get("b"), None);
    assert!(met.exact);
}

#[test]
fn lists_meet_elementwise() {
    let known = Value::list(vec![Value::Any, Value::any_int()]);
    let of = Value::list_of(Value::marker(Capabilities::NUMERIC));
    assert_eq!(
        meet(&known, &of),
        Value::list(vec![Value::marker(Capabilities::NUMERIC), Value::any_int()])
    );
    assert_eq!(
        meet(&Value::list(vec![Value::Nil]), &of),
        Value::Never
    );
}

#[test]
#[should_panic(expected = "value intersection depth")]
fn runaway_nesting_panics() {
    let mut a = Value::any_int();
    let mut b = Value::any_string();
    for _ in 0..100 {
        a = Value::list(vec![a, Value::any_int()]);
        b = Value::list(vec![b, Value::Any]);
    }
    let _ = meet(&a, &b);
}
