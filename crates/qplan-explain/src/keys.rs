//! Key-Collision Resolver for MariaDB plans
//!
//! MariaDB repeats the `"table"` key once per joined table inside a single
//! JSON object. Before decoding, every occurrence of the literal `"table"`
//! token is renamed to `"table0"`, `"table1"`, ... in left-to-right order,
//! so sibling tables survive decoding and their index equals their source
//! position. The tree builders turn the renamed keys back into `children`
//! edges in ascending index order; renamed keys left inside passthrough
//! attributes are cleared by [`restore_renamed_keys`].

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const TABLE_KEY: &str = "table";
const CHILDREN_KEY: &str = "children";

static TABLE_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""table""#).expect("valid regex"));

/// Plan text with every duplicate `table` key numbered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedTables {
    pub text: String,
    /// Number of renamed occurrences; indices `0..count` are in use
    pub count: usize,
}

/// Renames each `"table"` token to `"table<N>"`, numbering from 0 in source order
pub fn rename_duplicate_tables(text: &str) -> RenamedTables {
    let mut count = 0;
    let text = TABLE_TOKEN_REGEX
        .replace_all(text, |_: &regex::Captures<'_>| {
            let renamed = format!("\"{TABLE_KEY}{count}\"");
            count += 1;
            renamed
        })
        .into_owned();

    if count > 0 {
        tracing::debug!(count, "renamed duplicate table keys");
    }

    RenamedTables { text, count }
}

/// Index of a renamed `table<N>` key
pub fn table_index(key: &str) -> Option<usize> {
    let digits = key.strip_prefix(TABLE_KEY)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// True for `table` itself and for renamed `table<N>` keys
pub fn is_table_key(key: &str) -> bool {
    key == TABLE_KEY || table_index(key).is_some()
}

/// Rewrites renamed `table<N>` keys back out of a JSON value
///
/// A lone renamed key in an object is restored to `table`. When an object
/// holds several, they are removed and their values appended to the
/// object's `children` array in ascending index order.
pub fn restore_renamed_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let renamed = map.keys().filter(|key| table_index(key).is_some()).count();
            let mut restored = serde_json::Map::with_capacity(map.len());
            let mut tables = Vec::with_capacity(renamed);
            for (key, mut child) in std::mem::take(map) {
                restore_renamed_keys(&mut child);
                match table_index(&key) {
                    Some(_) if renamed == 1 => {
                        restored.insert(TABLE_KEY.to_string(), child);
                    }
                    Some(index) => tables.push((index, child)),
                    None => {
                        restored.insert(key, child);
                    }
                }
            }

            if !tables.is_empty() {
                tables.sort_by_key(|(index, _)| *index);
                let children = restored
                    .entry(CHILDREN_KEY)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !children.is_array() {
                    *children = Value::Array(vec![children.take()]);
                }
                if let Value::Array(items) = children {
                    items.extend(tables.into_iter().map(|(_, table)| table));
                }
            }

            *map = restored;
        }
        Value::Array(items) => items.iter_mut().for_each(restore_renamed_keys),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_renames_in_source_order() {
        let text = r#"{"table": {"table_name": "a"}, "table": {"table_name": "b"}, "table": {"table_name": "c"}}"#;
        let renamed = rename_duplicate_tables(text);

        assert_eq!(renamed.count, 3);
        assert_eq!(
            renamed.text,
            r#"{"table0": {"table_name": "a"}, "table1": {"table_name": "b"}, "table2": {"table_name": "c"}}"#
        );
    }

    #[test]
    fn test_odd_occurrence_gets_next_index() {
        let text = r#"{"table": {}, "x": {"table": {}, "table": {}}}"#;
        let renamed = rename_duplicate_tables(text);

        assert_eq!(renamed.count, 3);
        assert_eq!(renamed.text, r#"{"table0": {}, "x": {"table1": {}, "table2": {}}}"#);
    }

    #[test]
    fn test_similar_keys_are_untouched() {
        let text = r#"{"table_name": "t", "temporary_table": {}, "using_temporary_table": true}"#;
        let renamed = rename_duplicate_tables(text);

        assert_eq!(renamed.count, 0);
        assert_eq!(renamed.text, text);
    }

    #[test]
    fn test_renamed_text_decodes_every_table() {
        let text = r#"{"table": {"n": 1}, "table": {"n": 2}, "table": {"n": 3}, "table": {"n": 4}}"#;
        let renamed = rename_duplicate_tables(text);
        let value: Value = serde_json::from_str(&renamed.text).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["table0", "table1", "table2", "table3"]);
    }

    #[test]
    fn test_table_index() {
        assert_eq!(table_index("table0"), Some(0));
        assert_eq!(table_index("table12"), Some(12));
        assert_eq!(table_index("table"), None);
        assert_eq!(table_index("table_name"), None);
        assert_eq!(table_index("temporary_table"), None);
        assert_eq!(table_index("table-1"), None);

        assert!(is_table_key("table"));
        assert!(is_table_key("table3"));
        assert!(!is_table_key("tables"));
    }

    #[test]
    fn test_restore_renamed_keys() {
        let mut value = json!({
            "temporary_table": {"table4": {"table_name": "t"}},
            "list": [{"table7": {}}],
            "table_name": "kept",
            "pair": {"table8": {}, "table9": {}}
        });
        restore_renamed_keys(&mut value);

        assert_eq!(
            value,
            json!({
                "temporary_table": {"table": {"table_name": "t"}},
                "list": [{"table": {}}],
                "table_name": "kept",
                "pair": {"children": [{}, {}]}
            })
        );
    }

    #[test]
    fn test_restore_several_keys_into_children() {
        let mut value = json!({
            "query_block": {
                "select_id": 3,
                "table12": {"table_name": "c"},
                "table2": {"table_name": "b", "nested": {"table5": {"table_name": "d"}}},
                "children": {"table_name": "a"}
            }
        });
        restore_renamed_keys(&mut value);

        assert_eq!(
            value,
            json!({
                "query_block": {
                    "select_id": 3,
                    "children": [
                        {"table_name": "a"},
                        {"table_name": "b", "nested": {"table": {"table_name": "d"}}},
                        {"table_name": "c"}
                    ]
                }
            })
        );
    }
}
