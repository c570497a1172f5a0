//! Canonical Tree Normalizer - last pass before a plan is returned
//!
//! The builders already produce well-formed trees; this pass enforces the
//! invariants the visualization layer relies on for any tree, including
//! ones assembled by hand or decoded from JSON:
//! - every node has one non-empty label
//! - `children` is always a list, never an attribute
//! - no dialect bookkeeping (renamed `table<N>` keys) leaks into attributes

use crate::keys::restore_renamed_keys;
use crate::lookup::labels;
use crate::plan::CanonicalNode;
use serde_json::Value;

const CHILDREN_KEY: &str = "children";
const NODE_TYPE_KEY: &str = "Node Type";

/// Normalizes a canonical tree, recursively
pub fn normalize(mut node: CanonicalNode) -> CanonicalNode {
    if let Some(stray) = node.attributes.shift_remove(NODE_TYPE_KEY) {
        if node.node_type.is_empty() {
            if let Value::String(label) = stray {
                node.node_type = label;
            }
        }
    }
    if node.node_type.is_empty() {
        node.node_type = labels::UNKNOWN.to_string();
    }

    let mut attributes = Value::Object(std::mem::take(&mut node.attributes).into_iter().collect());
    restore_renamed_keys(&mut attributes);
    if let Value::Object(map) = attributes {
        node.attributes = map.into_iter().collect();
    }

    if let Some(children) = node.attributes.shift_remove(CHILDREN_KEY) {
        let children = match children {
            Value::Array(items) => items,
            single => vec![single],
        };
        node.children.extend(children.into_iter().map(node_from_value));
    }

    node.children = node.children.into_iter().map(normalize).collect();
    node
}

/// Reads a child given as raw JSON; anything that is not a node becomes `Unknown`
fn node_from_value(value: Value) -> CanonicalNode {
    match serde_json::from_value(value) {
        Ok(node) => node,
        Err(err) => {
            tracing::debug!(%err, "child is not a plan node");
            CanonicalNode::new(labels::UNKNOWN)
        }
    }
}

#[cfg(test)]
mod tests;
