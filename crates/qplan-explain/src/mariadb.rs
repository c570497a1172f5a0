//! MariaDB EXPLAIN Tree Builder
//!
//! MariaDB lists every joined table of a level as a sibling `table` key of
//! one object. By the time the document reaches this module the keys have
//! been numbered (`table0`, `table1`, ...) in source order, see
//! [`crate::keys`]. A level's *table set* is every entry occupying a join
//! slot: the numbered tables (bare or inside a `block-nl-join` wrapper), a
//! `read_sorted_file` wrapper (sort before join) and a trailing `subqueries`
//! list. One slot becomes a single child;
//! several are folded into a left-deep tree of `Join` nodes.
//!
//! ```text
//!   {read_sorted_file, table2, table3, subqueries}
//!     =>  Join(Join(Join(Sort, table2), table3), Attached Subquery)
//! ```

use crate::classify::{Role, classify};
use crate::dialect::Dialect;
use crate::join::{JoinMember, fold_left_deep};
use crate::keys::is_table_key;
use crate::lookup::labels;
use crate::mysql::merge_wrapper_attributes;
use crate::plan::CanonicalNode;
use crate::raw::{Mapping, RawNode};
use serde_json::Value;

const BLOCK_NESTED_LOOP_HINT: &str = "Block Nested Loop";

/// Non-table slot keys copied from an expression cache's sibling
const SIBLING_SLOT_KEYS: &[&str] = &["subqueries", "read_sorted_file", "block-nl-join"];

/// Builds the canonical tree of one decoded MariaDB plan document
///
/// Returns `None` when the document has no `query_block` object.
pub fn build_tree(document: &RawNode) -> Option<CanonicalNode> {
    let block = document.get("query_block")?.as_mapping()?;
    Some(build_block(labels::QUERY_ROOT, block))
}

fn build_block(label: &str, body: &Mapping) -> CanonicalNode {
    let mut node = CanonicalNode::new(label);
    let mut table_set_resolved = false;

    for (key, value) in body {
        let role = classify(key, value, Dialect::Mariadb);

        if role.is_join_slot() {
            // The whole table set is resolved at the position of its first slot
            if !table_set_resolved {
                table_set_resolved = true;
                node.children.extend(resolve_table_set(body));
            }
            if let Role::Subqueries(subqueries) = role {
                if subqueries.len() > 1 {
                    let rest = subqueries[1..].iter().map(RawNode::to_value).collect();
                    node.attributes.insert(key.clone(), Value::Array(rest));
                }
            }
            continue;
        }

        match role {
            Role::Operation { label, body } => node.children.push(build_block(label, body)),
            Role::TemporaryTable(set) => {
                let transparent = build_block(labels::UNKNOWN, set);
                node.children.extend(transparent.children);
                if !transparent.attributes.is_empty() {
                    let rest = transparent.attributes.into_iter().collect();
                    node.attributes.insert(key.clone(), Value::Object(rest));
                }
            }
            Role::Materialized(wrapper) => {
                match wrapper.get("query_block").and_then(RawNode::as_mapping) {
                    Some(block) => {
                        let mut child = build_block(labels::MATERIALIZE, block);
                        merge_wrapper_attributes(&mut child, wrapper, "query_block");
                        node.children.push(child);
                    }
                    None => pass_through(&mut node, key, value),
                }
            }
            _ => pass_through(&mut node, key, value),
        }
    }

    node
}

fn pass_through(node: &mut CanonicalNode, key: &str, value: &RawNode) {
    node.attributes.insert(key.to_string(), value.to_value());
}

/// Resolves the join slots of one level into a single subtree
///
/// Slot order is the sorted file first, then the tables by ascending index,
/// then the subqueries. Missing indices are simply skipped.
fn resolve_table_set(set: &Mapping) -> Option<CanonicalNode> {
    let mut sorted_file = None;
    let mut tables = Vec::new();
    let mut subqueries = None;

    for (key, value) in set {
        match classify(key, value, Dialect::Mariadb) {
            Role::ReadSortedFile(wrapper) => sorted_file = Some(wrapper),
            Role::Table { label, index, body } => {
                let hint = body.get("using_join_buffer").and_then(RawNode::as_str);
                let member = JoinMember::new(build_block(label, body)).with_join_hint(hint);
                tables.push((index, member));
            }
            Role::BlockNlJoin(wrapper) => match resolve_block_nl_join(wrapper) {
                Some(table) => tables.push(table),
                None => tracing::debug!("block-nl-join without a table"),
            },
            Role::Subqueries(entries) => subqueries = Some(entries),
            _ => {}
        }
    }
    tables.sort_by_key(|(index, _)| *index);

    let mut members = Vec::with_capacity(tables.len() + 2);
    if let Some(wrapper) = sorted_file {
        match resolve_sorted_file(wrapper) {
            Some(sort) => members.push(JoinMember::new(sort)),
            None => tracing::debug!("read_sorted_file without a sorted table"),
        }
    }
    members.extend(tables.into_iter().map(|(_, member)| member));
    if let Some(entries) = subqueries {
        match resolve_subqueries(entries) {
            Some(subquery) => members.push(JoinMember::new(subquery)),
            None => tracing::debug!("subqueries without a query block"),
        }
    }

    fold_left_deep(members, labels::JOIN)
}

/// `read_sorted_file` wraps a `filesort` whose table is read in sort order
fn resolve_sorted_file(wrapper: &Mapping) -> Option<CanonicalNode> {
    match wrapper.get("filesort").and_then(RawNode::as_mapping) {
        Some(filesort) => {
            let mut sort = build_block(labels::SORT, filesort);
            merge_wrapper_attributes(&mut sort, wrapper, "filesort");
            Some(sort)
        }
        None => resolve_table_set(wrapper),
    }
}

/// The table inside a `block-nl-join` wrapper, joined through a block nested loop
///
/// The wrapper's own fields (`buffer_type`, `join_type`, ...) are merged into
/// the table node. The table keeps its renamed index, so it sorts among its
/// bare siblings by source position.
fn resolve_block_nl_join(wrapper: &Mapping) -> Option<(Option<usize>, JoinMember)> {
    wrapper
        .iter()
        .find_map(|(key, value)| match classify(key, value, Dialect::Mariadb) {
            Role::Table { label, index, body } => {
                let mut node = build_block(label, body);
                merge_wrapper_attributes(&mut node, wrapper, key);
                let hint = body
                    .get("using_join_buffer")
                    .and_then(RawNode::as_str)
                    .unwrap_or(BLOCK_NESTED_LOOP_HINT);
                Some((index, JoinMember::new(node).with_join_hint(Some(hint))))
            }
            _ => None,
        })
}

/// Builds the first subquery of a `subqueries` slot as an attached subquery
///
/// A subquery behind an `expression_cache` lacks the table set it shares
/// with its sibling; the sibling's slot entries are copied into the cached
/// block before it is resolved.
fn resolve_subqueries(entries: &[RawNode]) -> Option<CanonicalNode> {
    let first = entries.first()?.as_mapping()?;

    let cache = first.get("expression_cache").and_then(RawNode::as_mapping);
    let cached_block = cache
        .and_then(|cache| cache.get("query_block"))
        .and_then(RawNode::as_mapping);

    let (Some(cache), Some(cached_block)) = (cache, cached_block) else {
        let block = first.get("query_block")?.as_mapping()?;
        let mut node = build_block(labels::ATTACHED_SUBQUERY, block);
        merge_wrapper_attributes(&mut node, first, "query_block");
        return Some(node);
    };

    let mut block = cached_block.clone();
    let sibling = entries
        .get(1)
        .and_then(|sibling| sibling.get("query_block"))
        .and_then(RawNode::as_mapping);
    if let Some(sibling) = sibling {
        let mut copied = 0;
        for (key, value) in sibling {
            if is_table_key(key) || SIBLING_SLOT_KEYS.contains(&key.as_str()) {
                block.insert(key.clone(), value.clone());
                copied += 1;
            }
        }
        tracing::debug!(copied, "copied sibling table set into cached subquery");
    }

    let mut node = build_block(labels::ATTACHED_SUBQUERY, &block);
    merge_wrapper_attributes(&mut node, first, "expression_cache");

    let cache_fields: serde_json::Map<String, Value> = cache
        .iter()
        .filter(|(key, _)| *key != "query_block")
        .map(|(key, value)| (key.clone(), value.to_value()))
        .collect();
    if !cache_fields.is_empty() {
        node.attributes
            .insert("expression_cache".to_string(), Value::Object(cache_fields));
    }

    Some(node)
}
