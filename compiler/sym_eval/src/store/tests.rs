use std::sync::Arc;

use pretty_assertions::assert_eq;
use sym_diagnostic::messages;
use sym_ir::{Name, NodeClass, NodeId, SourcePos, Span};
use sym_lattice::{Pattern, Value};

use super::*;

fn pos(start: u32) -> SourcePos {
    SourcePos::new(Arc::from("unit"), Span::new(start, start + 1))
}

#[test]
fn errors_are_deduplicated_by_located_message() {
    let mut store = AnalysisStore::default();
    store.add_error(messages::unknown_variable(pos(1), "x"));
    store.add_error(messages::unknown_variable(pos(1), "x"));
    store.add_error(messages::unknown_variable(pos(2), "x"));

    assert_eq!(store.errors().len(), 2);
}

#[test]
fn report_routes_by_severity() {
    let mut store = AnalysisStore::default();
    store.report(messages::unreachable_arm(pos(0), "%int"));
    store.report(messages::unreachable_arm(pos(0), "%int"));
    store.report(messages::self_outside_method(pos(0)));

    assert_eq!(store.warnings().len(), 1);
    assert_eq!(store.errors().len(), 1);
}

#[test]
fn error_limit_drops_and_counts() {
    let mut store = AnalysisStore::new(AnalysisConfig::default().with_error_limit(1));
    store.add_error(messages::unknown_variable(pos(1), "a"));
    store.add_error(messages::unknown_variable(pos(2), "b"));
    store.add_error(messages::unknown_variable(pos(3), "c"));

    assert_eq!(store.errors().len(), 1);
    assert_eq!(store.dropped_errors(), 2);
}

#[test]
fn node_values_are_first_writer_wins() {
    let mut store = AnalysisStore::default();
    let node = NodeId::new(7);
    store.set_most_specific_node_value(node, NodeClass::Expression, Value::int(1));
    store.set_most_specific_node_value(node, NodeClass::Expression, Value::any_int());
    store.set_less_specific_node_value(node, NodeClass::Expression, Value::any_int());

    assert_eq!(
        store.most_specific_node_value(node, NodeClass::Expression),
        Some(&Value::int(1))
    );
    assert_eq!(
        store.less_specific_node_value(node, NodeClass::Expression),
        Some(&Value::any_int())
    );
    assert_eq!(store.expected_value(node, NodeClass::Expression), None);
}

#[test]
#[should_panic(expected = "does not carry a value")]
fn node_value_lookup_rejects_statements() {
    let store = AnalysisStore::default();
    let _ = store.most_specific_node_value(NodeId::new(0), NodeClass::Statement);
}

#[test]
#[should_panic(expected = "does not carry a scope snapshot")]
fn scope_lookup_rejects_expressions() {
    let store = AnalysisStore::default();
    let _ = store.local_scope(NodeId::new(0), NodeClass::Expression);
}

#[test]
fn context_data_keeps_the_first_write() {
    let mut store = AnalysisStore::default();
    let block = NodeId::new(3);
    let p = Name::from_raw(1);
    store.set_context_data(block, NodeClass::Block, vec![(p, Pattern::Any)]);
    store.set_context_data(block, NodeClass::Block, Vec::new());
    assert_eq!(
        store.context_data(block, NodeClass::Block),
        Some(&[(p, Pattern::Any)][..])
    );
}

#[test]
fn scope_snapshot_lookup_by_name() {
    let x = Name::from_raw(2);
    let y = Name::from_raw(1);
    let snapshot = ScopeSnapshot::new(vec![
        VarSnapshot {
            name: x,
            value: Value::Nil,
            definition: Some(pos(4)),
        },
        VarSnapshot {
            name: y,
            value: Value::any_int(),
            definition: None,
        },
    ]);

    assert_eq!(snapshot.variables[0].name, y);
    assert_eq!(snapshot.get(x).unwrap().definition, Some(pos(4)));
    assert!(snapshot.get(Name::from_raw(9)).is_none());
}

#[test]
fn add_data_merges_without_overwriting() {
    let node = NodeId::new(1);
    let other_node = NodeId::new(2);
    let block = NodeId::new(3);

    let mut parent = AnalysisStore::default();
    parent.add_error(messages::unknown_variable(pos(1), "x"));
    parent.set_most_specific_node_value(node, NodeClass::Expression, Value::int(1));

    let mut nested = AnalysisStore::default();
    nested.add_error(messages::unknown_variable(pos(1), "x"));
    nested.add_error(messages::unknown_variable(pos(5), "y"));
    nested.add_warning(messages::unreachable_arm(pos(6), "%nil"));
    nested.set_most_specific_node_value(node, NodeClass::Expression, Value::Nil);
    nested.set_most_specific_node_value(other_node, NodeClass::Expression, Value::Nil);
    nested.set_local_scope(block, NodeClass::Block, ScopeSnapshot::default());
    nested.set_context_data(block, NodeClass::Block, vec![(Name::from_raw(1), Pattern::Any)]);

    parent.add_data(&nested);

    assert_eq!(parent.errors().len(), 2);
    assert_eq!(parent.warnings().len(), 1);
    assert_eq!(
        parent.most_specific_node_value(node, NodeClass::Expression),
        Some(&Value::int(1))
    );
    assert_eq!(
        parent.most_specific_node_value(other_node, NodeClass::Expression),
        Some(&Value::Nil)
    );
    assert!(parent.local_scope(block, NodeClass::Block).is_some());
    assert_eq!(parent.context_data(block, NodeClass::Block).unwrap().len(), 1);
}
