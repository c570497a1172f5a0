use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn all_nodes(node: &CanonicalNode) -> Vec<&CanonicalNode> {
    node.iter().collect()
}

#[test]
fn test_well_formed_tree_is_unchanged() {
    let tree = CanonicalNode::new("Nested Loop")
        .with_attribute("rows", 10)
        .with_child(CanonicalNode::new("Full Table Scan").with_attribute("table_name", "a"))
        .with_child(CanonicalNode::new("Unique Key Lookup").with_attribute("table_name", "b"));

    assert_eq!(normalize(tree.clone()), tree);
}

#[test]
fn test_empty_label_becomes_unknown() {
    let tree = CanonicalNode::new("").with_child(CanonicalNode::default());
    let normalized = normalize(tree);

    assert!(all_nodes(&normalized).iter().all(|n| n.node_type == labels::UNKNOWN));
}

#[test]
fn test_bare_object_children_attribute_is_wrapped() {
    let tree = CanonicalNode::new("Limit").with_attribute(
        "children",
        json!({"Node Type": "Full Table Scan", "table_name": "t"}),
    );
    let normalized = normalize(tree);

    assert!(normalized.attribute("children").is_none());
    assert_eq!(normalized.children.len(), 1);
    assert_eq!(normalized.children[0].node_type, "Full Table Scan");
    assert_eq!(normalized.children[0].attribute("table_name"), Some(&json!("t")));
}

#[test]
fn test_children_attribute_list_is_appended_and_normalized() {
    let tree = CanonicalNode::new("Join")
        .with_child(CanonicalNode::new("Full Table Scan"))
        .with_attribute(
            "children",
            json!([
                {"Node Type": "Sort", "children": {"Node Type": "Full Index Scan"}},
                {"rows": 3},
                "not a node"
            ]),
        );
    let normalized = normalize(tree);

    let labels: Vec<&str> = normalized.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Join", "Full Table Scan", "Sort", "Full Index Scan", "Unknown", "Unknown"]
    );
    assert_eq!(normalized.children[2].attribute("rows"), Some(&json!(3)));
}

#[test]
fn test_stray_node_type_attribute() {
    let mut node = CanonicalNode::default();
    node.attributes.insert("Node Type".to_string(), json!("Materialize"));
    let normalized = normalize(node);
    assert_eq!(normalized.node_type, "Materialize");
    assert!(normalized.attributes.is_empty());

    // An existing label wins over a stray attribute
    let node = CanonicalNode::new("Sort").with_attribute("Node Type", "Group");
    let normalized = normalize(node);
    assert_eq!(normalized.node_type, "Sort");
    assert!(normalized.attribute("Node Type").is_none());
}

#[test]
fn test_renamed_table_keys_are_restored_in_attributes() {
    let tree = CanonicalNode::new("Limit").with_child(
        CanonicalNode::new("Full Table Scan")
            .with_attribute("subqueries", json!([{"query_block": {"table4": {"table_name": "t"}}}])),
    );
    let normalized = normalize(tree);

    assert_eq!(
        normalized.children[0].attribute("subqueries"),
        Some(&json!([{"query_block": {"table": {"table_name": "t"}}}]))
    );
}

#[test]
fn test_several_renamed_keys_in_attributes_become_children() {
    let tree = CanonicalNode::new("Limit").with_attribute(
        "subqueries",
        json!([{"query_block": {
            "select_id": 3,
            "table3": {"table_name": "c"},
            "table2": {"table_name": "b"}
        }}]),
    );
    let normalized = normalize(tree);

    assert_eq!(
        normalized.attribute("subqueries"),
        Some(&json!([{"query_block": {
            "select_id": 3,
            "children": [{"table_name": "b"}, {"table_name": "c"}]
        }}]))
    );
}

#[test]
fn test_renamed_keys_on_the_node_itself() {
    let mut node = CanonicalNode::new("Limit");
    node.attributes.insert("table0".to_string(), json!({"table_name": "a"}));
    node.attributes.insert("table1".to_string(), json!({"table_name": "b"}));
    let normalized = normalize(node);

    assert!(normalized.attributes.is_empty());
    assert_eq!(normalized.children.len(), 2);
    assert_eq!(normalized.children[1].attribute("table_name"), Some(&json!("b")));
}

#[test]
fn test_invariants_hold_on_every_node() {
    let tree = CanonicalNode::new("").with_attribute(
        "children",
        json!([{"children": {"children": [{"Node Type": "Full Table Scan"}]}}]),
    );
    let normalized = normalize(tree);

    assert_eq!(normalized.node_count(), 4);
    for node in all_nodes(&normalized) {
        assert!(!node.node_type.is_empty());
        assert!(node.attribute("children").is_none());
    }
}
