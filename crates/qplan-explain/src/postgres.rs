//! PostgreSQL EXPLAIN Tree Builder
//!
//! `EXPLAIN (FORMAT JSON)` output is already a tree: every node carries its
//! own `"Node Type"` and lists its inputs under `"Plans"`. Building the
//! canonical tree only renames `Plans` to `children` and keeps every other
//! field as a display attribute.
//!
//! # Examples
//!
//! ```
//! use qplan_explain::{RawNode, postgres};
//!
//! let document = RawNode::parse(r#"[
//!   {
//!     "Plan": {
//!       "Node Type": "Hash Join",
//!       "Total Cost": 42.5,
//!       "Plans": [
//!         {"Node Type": "Seq Scan", "Relation Name": "orders"},
//!         {"Node Type": "Hash", "Plans": [{"Node Type": "Seq Scan", "Relation Name": "users"}]}
//!       ]
//!     },
//!     "Execution Time": 1.25
//!   }
//! ]"#).unwrap();
//!
//! let plan = postgres::build_plan(&document).unwrap();
//! assert_eq!(plan.root.node_type, "Hash Join");
//! assert_eq!(plan.root.node_count(), 4);
//! assert_eq!(plan.execution_time_ms, Some(1.25));
//! ```

use crate::classify::{Role, classify};
use crate::dialect::Dialect;
use crate::lookup::labels;
use crate::plan::CanonicalNode;
use crate::raw::{Mapping, RawNode};

const NODE_TYPE_KEY: &str = "Node Type";

/// Canonical tree and top-level timings of one PostgreSQL plan
#[derive(Debug, Clone, PartialEq)]
pub struct PostgresPlan {
    pub root: CanonicalNode,
    /// `"Planning Time"`, in milliseconds
    pub planning_time_ms: Option<f64>,
    /// `"Execution Time"`, in milliseconds (`EXPLAIN ANALYZE` only)
    pub execution_time_ms: Option<f64>,
}

/// Builds the plan of one decoded PostgreSQL document
///
/// The document is the JSON array psql prints per query; a bare object is
/// treated as its only element. Returns `None` when the first element has no
/// `"Plan"` object.
pub fn build_plan(document: &RawNode) -> Option<PostgresPlan> {
    let top = match document {
        RawNode::Sequence(items) => items.first()?,
        other => other,
    };
    let plan = top.get("Plan")?.as_mapping()?;

    Some(PostgresPlan {
        root: build_node(plan),
        planning_time_ms: top.get("Planning Time").and_then(RawNode::as_f64),
        execution_time_ms: top.get("Execution Time").and_then(RawNode::as_f64),
    })
}

fn build_node(body: &Mapping) -> CanonicalNode {
    let label = match body.get(NODE_TYPE_KEY).and_then(RawNode::as_str) {
        Some(label) if !label.is_empty() => label,
        _ => {
            tracing::debug!("plan node without a Node Type");
            labels::UNKNOWN
        }
    };
    let mut node = CanonicalNode::new(label);

    for (key, value) in body {
        if key == NODE_TYPE_KEY {
            continue;
        }
        match classify(key, value, Dialect::Postgresql) {
            Role::Plans(plans) => node.children.extend(
                plans
                    .iter()
                    .filter_map(RawNode::as_mapping)
                    .map(build_node),
            ),
            _ => {
                node.attributes.insert(key.clone(), value.to_value());
            }
        }
    }

    node
}
