//! Node Classifier - decides what a raw `(key, value)` entry means
//!
//! The tree builders walk each raw mapping entry by entry and ask the
//! classifier for the entry's [`Role`]. Keys the dialect does not give a
//! structural meaning, and recognized keys whose value has the wrong shape,
//! are [`Role::Passthrough`] and end up as display attributes.

use crate::dialect::Dialect;
use crate::keys::{is_table_key, table_index};
use crate::lookup::{operation_label, scan_label};
use crate::raw::{Mapping, RawNode};

/// Structural meaning of one raw mapping entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role<'a> {
    /// `grouping_operation`, `ordering_operation`, `duplicates_removal`, `filesort`
    Operation { label: &'static str, body: &'a Mapping },
    /// A table access, labeled from its `access_type`
    Table {
        label: &'static str,
        /// Source position for renamed MariaDB keys
        index: Option<usize>,
        body: &'a Mapping,
    },
    /// MySQL `nested_loop`: the per-table entries of one join level
    NestedLoop(&'a [RawNode]),
    /// MySQL `attached_subqueries`
    AttachedSubqueries(&'a [RawNode]),
    /// `materialized_from_subquery` (MySQL) or `materialized` (MariaDB)
    Materialized(&'a Mapping),
    /// `subqueries` entries of a block or join level
    Subqueries(&'a [RawNode]),
    /// MariaDB `temporary_table` holding a table set
    TemporaryTable(&'a Mapping),
    /// MariaDB `read_sorted_file` wrapping a `filesort`
    ReadSortedFile(&'a Mapping),
    /// MariaDB `block-nl-join` wrapping one table read through a join buffer
    BlockNlJoin(&'a Mapping),
    /// MySQL `union_result`
    UnionResult(&'a Mapping),
    /// PostgreSQL `Plans`
    Plans(&'a [RawNode]),
    /// Anything else: copied through as an attribute
    Passthrough,
}

impl Role<'_> {
    /// True for entries that occupy a join slot in a MariaDB table set
    pub fn is_join_slot(&self) -> bool {
        matches!(
            self,
            Role::Table { .. }
                | Role::Subqueries(_)
                | Role::ReadSortedFile(_)
                | Role::BlockNlJoin(_)
        )
    }
}

/// Classifies one raw entry found under `key`
pub fn classify<'a>(key: &str, value: &'a RawNode, dialect: Dialect) -> Role<'a> {
    match dialect {
        Dialect::Postgresql => classify_postgres(key, value),
        Dialect::Mysql => classify_mysql(key, value),
        Dialect::Mariadb => classify_mariadb(key, value),
    }
}

fn classify_postgres<'a>(key: &str, value: &'a RawNode) -> Role<'a> {
    match (key, value) {
        ("Plans", RawNode::Sequence(plans)) => Role::Plans(plans),
        _ => Role::Passthrough,
    }
}

fn classify_mysql<'a>(key: &str, value: &'a RawNode) -> Role<'a> {
    match (key, value) {
        ("nested_loop", RawNode::Sequence(entries)) => Role::NestedLoop(entries),
        ("attached_subqueries", RawNode::Sequence(subqueries)) => {
            Role::AttachedSubqueries(subqueries)
        }
        ("materialized_from_subquery" | "materialized", RawNode::Mapping(wrapper)) => {
            Role::Materialized(wrapper)
        }
        ("subqueries", RawNode::Sequence(subqueries)) => Role::Subqueries(subqueries),
        ("union_result", RawNode::Mapping(union)) => Role::UnionResult(union),
        ("table", RawNode::Mapping(body)) => table_role(key, body),
        (_, RawNode::Mapping(body)) => match operation_label(key) {
            Some(label) => Role::Operation { label, body },
            None => Role::Passthrough,
        },
        _ => Role::Passthrough,
    }
}

fn classify_mariadb<'a>(key: &str, value: &'a RawNode) -> Role<'a> {
    match (key, value) {
        ("materialized" | "materialized_from_subquery", RawNode::Mapping(wrapper)) => {
            Role::Materialized(wrapper)
        }
        ("temporary_table", RawNode::Mapping(set)) => Role::TemporaryTable(set),
        ("read_sorted_file", RawNode::Mapping(wrapper)) => Role::ReadSortedFile(wrapper),
        ("block-nl-join", RawNode::Mapping(wrapper)) => Role::BlockNlJoin(wrapper),
        ("subqueries", RawNode::Sequence(subqueries)) => Role::Subqueries(subqueries),
        (_, RawNode::Mapping(body)) if is_table_key(key) => table_role(key, body),
        (_, RawNode::Mapping(body)) => match operation_label(key) {
            Some(label) => Role::Operation { label, body },
            None => Role::Passthrough,
        },
        _ => Role::Passthrough,
    }
}

fn table_role<'a>(key: &str, body: &'a Mapping) -> Role<'a> {
    let access_type = body.get("access_type").and_then(RawNode::as_str);
    Role::Table {
        label: scan_label(access_type),
        index: table_index(key),
        body,
    }
}
