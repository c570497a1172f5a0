//! Join folding - builds a left-deep join tree from one join level
//!
//! The members of a join level are listed flat, in join order. Folding them
//! gives a binary tree whose right child at each level is the most recently
//! joined member:
//!
//! ```text
//!   [t1, t2, t3]  =>  Join(Join(t1, t2), t3)
//! ```
//!
//! A join node is labeled from the join-buffer hint of its right member when
//! the hint is a known variant, and with the level's generic label otherwise.

use crate::lookup::join_label;
use crate::plan::CanonicalNode;

/// One member of a join level
#[derive(Debug, Clone, PartialEq)]
pub struct JoinMember {
    pub node: CanonicalNode,
    /// Raw `using_join_buffer` value, if the member carries one
    pub join_hint: Option<String>,
}

impl JoinMember {
    pub fn new(node: CanonicalNode) -> Self {
        Self {
            node,
            join_hint: None,
        }
    }

    pub fn with_join_hint(mut self, hint: Option<&str>) -> Self {
        self.join_hint = hint.map(String::from);
        self
    }
}

/// Folds members into a left-deep tree, preserving their left-to-right order
///
/// A single member is returned as-is; an empty level yields `None`.
pub fn fold_left_deep(members: Vec<JoinMember>, generic_label: &str) -> Option<CanonicalNode> {
    let mut members = members.into_iter();
    let first = members.next()?;

    Some(members.fold(first.node, |joined, member| {
        let label = member
            .join_hint
            .as_deref()
            .and_then(join_label)
            .unwrap_or(generic_label);
        CanonicalNode::new(label)
            .with_child(joined)
            .with_child(member.node)
    }))
}
