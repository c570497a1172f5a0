//! MySQL EXPLAIN Tree Builder
//!
//! Rebuilds the canonical tree from a decoded `EXPLAIN FORMAT=JSON` document.
//!
//! MySQL nests plan structure under well-known keys rather than listing
//! children explicitly:
//! - `query_block` is the root; structural operators such as
//!   `ordering_operation` and `grouping_operation` wrap the rest
//! - `table` is a single table access, labeled from its `access_type`
//! - `nested_loop` lists the tables of one join level, in join order
//! - `attached_subqueries`, `materialized_from_subquery`, `subqueries` and
//!   `union_result` hang nested query blocks off a table or block
//!
//! # Examples
//!
//! ```
//! use qplan_explain::{RawNode, mysql};
//!
//! let document = RawNode::parse(r#"{
//!   "query_block": {
//!     "select_id": 1,
//!     "table": {"table_name": "users", "access_type": "ALL"}
//!   }
//! }"#).unwrap();
//!
//! let root = mysql::build_tree(&document).unwrap();
//! assert_eq!(root.node_type, "Limit");
//! assert_eq!(root.children[0].node_type, "Full Table Scan");
//! ```

use crate::classify::{Role, classify};
use crate::dialect::Dialect;
use crate::join::{JoinMember, fold_left_deep};
use crate::lookup::labels;
use crate::plan::CanonicalNode;
use crate::raw::{Mapping, RawNode};
use serde_json::Value;

/// Builds the canonical tree of one decoded MySQL plan document
///
/// Returns `None` when the document has no `query_block` object.
pub fn build_tree(document: &RawNode) -> Option<CanonicalNode> {
    let block = document.get("query_block")?.as_mapping()?;
    Some(build_node(labels::QUERY_ROOT, block))
}

/// Builds a node from a raw body, turning structural entries into children
fn build_node(label: &str, body: &Mapping) -> CanonicalNode {
    let mut node = CanonicalNode::new(label);

    for (key, value) in body {
        match classify(key, value, Dialect::Mysql) {
            Role::Operation { label, body } | Role::Table { label, body, .. } => {
                node.children.push(build_node(label, body));
            }
            Role::NestedLoop(entries) => match build_nested_loop(entries) {
                Some(join) => node.children.push(join),
                None => pass_through(&mut node, key, value),
            },
            Role::AttachedSubqueries(subqueries) => {
                let first = subqueries
                    .first()
                    .and_then(|first| build_subquery(first, labels::ATTACHED_SUBQUERY));
                match first {
                    Some(child) => {
                        node.children.push(child);
                        // Only the first attached subquery becomes a child
                        if subqueries.len() > 1 {
                            let rest = subqueries[1..].iter().map(RawNode::to_value).collect();
                            node.attributes.insert(key.clone(), Value::Array(rest));
                        }
                    }
                    None => pass_through(&mut node, key, value),
                }
            }
            Role::Materialized(wrapper) => {
                match build_subquery_block(wrapper, labels::MATERIALIZE) {
                    Some(child) => node.children.push(child),
                    None => pass_through(&mut node, key, value),
                }
            }
            Role::Subqueries(subqueries) => {
                let children: Vec<CanonicalNode> = subqueries
                    .iter()
                    .filter_map(|subquery| build_subquery(subquery, labels::SUBQUERY))
                    .collect();
                if children.is_empty() {
                    pass_through(&mut node, key, value);
                }
                node.children.extend(children);
            }
            Role::UnionResult(union) => node.children.push(build_union(union)),
            _ => pass_through(&mut node, key, value),
        }
    }

    node
}

fn pass_through(node: &mut CanonicalNode, key: &str, value: &RawNode) {
    node.attributes.insert(key.to_string(), value.to_value());
}

/// Folds a `nested_loop` level into a left-deep tree of join nodes
fn build_nested_loop(entries: &[RawNode]) -> Option<CanonicalNode> {
    let members: Vec<JoinMember> = entries
        .iter()
        .filter_map(|entry| {
            let table = entry.as_mapping().and_then(|map| {
                map.iter().find_map(|(key, value)| match classify(key, value, Dialect::Mysql) {
                    Role::Table { label, body, .. } => Some((label, body)),
                    _ => None,
                })
            });
            if table.is_none() {
                tracing::debug!("skipping nested_loop entry without a table");
            }
            let (label, body) = table?;
            let hint = body.get("using_join_buffer").and_then(RawNode::as_str);
            Some(JoinMember::new(build_node(label, body)).with_join_hint(hint))
        })
        .collect();

    fold_left_deep(members, labels::NESTED_LOOP)
}

/// Builds a subquery entry of the form `{..., "query_block": {...}}`
fn build_subquery(entry: &RawNode, label: &str) -> Option<CanonicalNode> {
    build_subquery_block(entry.as_mapping()?, label)
}

/// Builds the wrapped `query_block`, keeping the wrapper's own fields as attributes
fn build_subquery_block(wrapper: &Mapping, label: &str) -> Option<CanonicalNode> {
    let block = wrapper.get("query_block")?.as_mapping()?;
    let mut node = build_node(label, block);
    merge_wrapper_attributes(&mut node, wrapper, "query_block");
    Some(node)
}

/// Copies a wrapper's own fields (all but `inner_key`) onto the node built from it
///
/// Fields already present on the node win.
pub(crate) fn merge_wrapper_attributes(
    node: &mut CanonicalNode,
    wrapper: &Mapping,
    inner_key: &str,
) {
    for (key, value) in wrapper {
        if key != inner_key && !node.attributes.contains_key(key) {
            node.attributes.insert(key.clone(), value.to_value());
        }
    }
}

/// Parses `union_result`: one child per member query block
fn build_union(union: &Mapping) -> CanonicalNode {
    let mut node = CanonicalNode::new(labels::UNION);

    for (key, value) in union {
        let members = (key == "query_specifications")
            .then(|| value.as_sequence())
            .flatten();
        match members {
            Some(specs) => node.children.extend(
                specs
                    .iter()
                    .filter_map(|spec| build_subquery(spec, labels::SUBQUERY)),
            ),
            None => pass_through(&mut node, key, value),
        }
    }

    node
}
