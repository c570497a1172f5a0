//! Raw plan documents as decoded from dialect JSON
//!
//! `RawNode` is a closed three-way variant over the decoded document. Mapping
//! keys keep the order they had in the source text, which the MariaDB table
//! resolution relies on.

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered string-keyed mapping of raw nodes
pub type Mapping = IndexMap<String, RawNode>;

/// A node of a decoded, dialect-native plan document
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    /// Null, boolean, number or string
    Scalar(Value),
    /// Ordered sequence of nodes
    Sequence(Vec<RawNode>),
    /// Object with keys in source order
    Mapping(Mapping),
}

impl RawNode {
    /// Decodes JSON text into a raw node tree
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from(value))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[RawNode]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => value.as_f64(),
            _ => None,
        }
    }

    /// Looks up a key when this node is a mapping
    pub fn get(&self, key: &str) -> Option<&RawNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Converts back into a plain JSON value for passthrough attributes
    pub fn to_value(&self) -> Value {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Sequence(items) => Value::Array(items.iter().map(RawNode::to_value).collect()),
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, node)| (key.clone(), node.to_value()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for RawNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items.into_iter().map(RawNode::from).collect()),
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, RawNode::from(value)))
                    .collect(),
            ),
            scalar => Self::Scalar(scalar),
        }
    }
}

impl From<RawNode> for Value {
    fn from(node: RawNode) -> Self {
        match node {
            RawNode::Scalar(value) => value,
            RawNode::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RawNode::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(key, node)| (key, Value::from(node)))
                    .collect(),
            ),
        }
    }
}
