//! Tests for the Canonical Plan Model

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_join() -> CanonicalNode {
    //        Nested Loop
    //       /           \
    //  Full Table Scan  Unique Key Lookup
    CanonicalNode::new("Nested Loop")
        .with_child(CanonicalNode::new("Full Table Scan").with_attribute("table_name", "orders"))
        .with_child(CanonicalNode::new("Unique Key Lookup").with_attribute("table_name", "users"))
}

#[test]
fn test_node_builder() {
    let node = CanonicalNode::new("Index Range Scan")
        .with_attribute("table_name", "lineitem")
        .with_attribute("rows_examined_per_scan", 120);

    assert_eq!(node.node_type, "Index Range Scan");
    assert_eq!(node.attribute("table_name"), Some(&json!("lineitem")));
    assert_eq!(node.attribute("rows_examined_per_scan"), Some(&json!(120)));
    assert!(node.is_leaf());
}

#[test]
fn test_tree_traversal() {
    let root = sample_join();

    assert_eq!(root.node_count(), 3);
    assert_eq!(root.depth(), 2);
    assert!(!root.is_leaf());

    let labels: Vec<&str> = root.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(labels, vec!["Nested Loop", "Full Table Scan", "Unique Key Lookup"]);
}

#[test]
fn test_leaves_are_left_to_right() {
    let root = CanonicalNode::new("Join")
        .with_child(
            CanonicalNode::new("Join")
                .with_child(CanonicalNode::new("a"))
                .with_child(CanonicalNode::new("b")),
        )
        .with_child(CanonicalNode::new("c"));

    let leaves: Vec<&str> = root.leaves().iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(leaves, vec!["a", "b", "c"]);
    assert_eq!(root.depth(), 3);
}

#[test]
fn test_plan_helpers() {
    let plan = Plan::new(2, sample_join())
        .with_file_index(Some(1))
        .with_planning_time(0.2)
        .with_execution_time(4.5);

    assert_eq!(plan.query_number, 2);
    assert_eq!(plan.file_index, Some(1));
    assert_eq!(plan.planning_time_ms, Some(0.2));
    assert_eq!(plan.execution_time_ms, Some(4.5));
    assert_eq!(plan.find_nodes_by_type("Full Table Scan").len(), 1);
    assert!(plan.find_nodes_by_type("Hash Join").is_empty());
    assert_eq!(plan.leaf_labels(), vec!["Full Table Scan", "Unique Key Lookup"]);
}

#[test]
fn test_node_serializes_flat() {
    let value = serde_json::to_value(sample_join()).unwrap();

    assert_eq!(
        value,
        json!({
            "Node Type": "Nested Loop",
            "children": [
                {"Node Type": "Full Table Scan", "table_name": "orders", "children": []},
                {"Node Type": "Unique Key Lookup", "table_name": "users", "children": []}
            ]
        })
    );
}

#[test]
fn test_bare_children_object_is_wrapped() {
    let node: CanonicalNode = serde_json::from_value(json!({
        "Node Type": "Sort",
        "sort_key": "o_orderdate",
        "children": {"Node Type": "Full Table Scan"}
    }))
    .unwrap();

    assert_eq!(node.children.len(), 1);
    assert_eq!(node.children[0].node_type, "Full Table Scan");
    assert_eq!(node.attribute("sort_key"), Some(&json!("o_orderdate")));
    assert!(node.attribute("children").is_none());
}

#[test]
fn test_missing_or_null_children_is_empty() {
    let node: CanonicalNode =
        serde_json::from_value(json!({"Node Type": "Seq Scan", "children": null})).unwrap();
    assert!(node.children.is_empty());

    let node: CanonicalNode = serde_json::from_value(json!({"Node Type": "Seq Scan"})).unwrap();
    assert!(node.children.is_empty());
}

#[test]
fn test_plan_serialization_shape() {
    let plan = Plan::new(1, CanonicalNode::new("Seq Scan"));
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(
        value,
        json!({"queryNumber": 1, "plan": {"Node Type": "Seq Scan", "children": []}})
    );

    let plan = plan.with_file_index(Some(0));
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["fileIndex"], json!(0));

    let back: Plan = serde_json::from_value(value).unwrap();
    assert_eq!(back, plan);
}
