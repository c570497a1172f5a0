//! Canonical Plan Model - the dialect-independent plan tree
//!
//! Every dialect parser produces `CanonicalNode` trees. This is the only
//! schema the visualization layer reads: a label, an ordered list of
//! children and passthrough attributes. It serializes as a flat JSON object
//! with `"Node Type"`, the attributes, and a `"children"` array.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single node of the canonical plan tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalNode {
    /// Canonical operation label, e.g. "Full Table Scan" or "Nested Loop"
    #[serde(rename = "Node Type", default)]
    pub node_type: String,
    /// Raw fields passed through for display (costs, row estimates, ...)
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
    /// Child nodes, left to right
    #[serde(default, deserialize_with = "one_or_many")]
    pub children: Vec<CanonicalNode>,
}

impl CanonicalNode {
    /// Creates a leaf node with the given label
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Adds a child node
    pub fn with_child(mut self, child: CanonicalNode) -> Self {
        self.children.push(child);
        self
    }

    /// Adds several child nodes in order
    pub fn with_children(mut self, children: impl IntoIterator<Item = CanonicalNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Sets a passthrough attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Depth-first, pre-order iterator over this subtree
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter::new(self)
    }

    /// Leaf nodes of this subtree, left to right
    pub fn leaves(&self) -> Vec<&CanonicalNode> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CanonicalNode>),
    One(Box<CanonicalNode>),
}

/// A bare object under `children` is read as a one-element list
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<CanonicalNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(nodes)) => nodes,
        Some(OneOrMany::One(node)) => vec![*node],
        None => Vec::new(),
    })
}

/// One normalized query plan from a dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// 1-based position of the query within the source dump
    pub query_number: usize,
    /// Which uploaded file the plan came from (comparison mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_index: Option<usize>,
    /// Planning time in milliseconds (PostgreSQL, if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_time_ms: Option<f64>,
    /// Execution time in milliseconds (PostgreSQL EXPLAIN ANALYZE, if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    /// Root of the canonical tree
    #[serde(rename = "plan")]
    pub root: CanonicalNode,
}

impl Plan {
    pub fn new(query_number: usize, root: CanonicalNode) -> Self {
        Self {
            query_number,
            file_index: None,
            planning_time_ms: None,
            execution_time_ms: None,
            root,
        }
    }

    pub fn with_file_index(mut self, file_index: Option<usize>) -> Self {
        self.file_index = file_index;
        self
    }

    pub fn with_planning_time(mut self, ms: f64) -> Self {
        self.planning_time_ms = Some(ms);
        self
    }

    pub fn with_execution_time(mut self, ms: f64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Returns an iterator over all nodes in the plan (depth-first)
    pub fn iter_nodes(&self) -> NodeIter<'_> {
        self.root.iter()
    }

    /// Finds all nodes carrying the given label
    pub fn find_nodes_by_type(&self, node_type: &str) -> Vec<&CanonicalNode> {
        self.iter_nodes()
            .filter(|n| n.node_type == node_type)
            .collect()
    }

    /// Labels of the leaf nodes, left to right
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.root
            .leaves()
            .into_iter()
            .map(|n| n.node_type.as_str())
            .collect()
    }
}

/// Iterator for traversing canonical nodes depth-first
pub struct NodeIter<'a> {
    stack: Vec<&'a CanonicalNode>,
}

impl<'a> NodeIter<'a> {
    fn new(root: &'a CanonicalNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a CanonicalNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests;
