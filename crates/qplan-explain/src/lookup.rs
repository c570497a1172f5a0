//! Static token-to-label tables for the MySQL-family dialects
//!
//! Lookup is first match on exact token equality. Callers decide what an
//! unmatched token means: access types fall back to [`labels::UNKNOWN`],
//! join hints keep the generic join label.

/// Canonical node labels produced by the tree builders
pub mod labels {
    /// Root query block of a MySQL or MariaDB plan
    pub const QUERY_ROOT: &str = "Limit";
    pub const NESTED_LOOP: &str = "Nested Loop";
    pub const JOIN: &str = "Join";
    pub const ATTACHED_SUBQUERY: &str = "Attached Subquery";
    pub const MATERIALIZE: &str = "Materialize";
    pub const SORT: &str = "Sort";
    pub const UNION: &str = "Union";
    pub const SUBQUERY: &str = "Subquery";
    pub const UNKNOWN: &str = "Unknown";
}

/// Structural operator keys
pub const OPERATIONS: &[(&str, &str)] = &[
    ("grouping_operation", "Group"),
    ("ordering_operation", "Order"),
    ("duplicates_removal", "Distinct"),
    ("filesort", "Sort"),
];

/// Join-buffer hints
pub const JOIN_VARIANTS: &[(&str, &str)] = &[
    ("Block Nested Loop", "Block Nested Loop"),
    ("Batched Key Access", "Batched Key Access"),
    ("hash join", "Hash Join"),
];

/// Table access types
pub const ACCESS_TYPES: &[(&str, &str)] = &[
    ("system", "Single Row\n(system constant)"),
    ("const", "Single Row\n(constant)"),
    ("eq_ref", "Unique Key Lookup"),
    ("ref", "Non-Unique Key Lookup"),
    ("fulltext", "Fulltext Index Search"),
    ("ref_or_null", "Key Lookup +\nFetch NULL Values"),
    ("index_merge", "Index Merge"),
    ("unique_subquery", "Unique Key Lookup\ninto table of subquery"),
    ("index_subquery", "Non-Unique Key Lookup\ninto table of subquery"),
    ("range", "Index Range Scan"),
    ("index", "Full Index Scan"),
    ("ALL", "Full Table Scan"),
];

fn lookup(table: &[(&str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(raw, _)| *raw == token)
        .map(|(_, label)| *label)
}

/// Label for a structural operator key such as `ordering_operation`
pub fn operation_label(key: &str) -> Option<&'static str> {
    lookup(OPERATIONS, key)
}

/// Label for a `using_join_buffer` hint
pub fn join_label(hint: &str) -> Option<&'static str> {
    lookup(JOIN_VARIANTS, hint)
}

/// Label for a table's `access_type`, `"Unknown"` when absent or unmatched
pub fn scan_label(access_type: Option<&str>) -> &'static str {
    match access_type.and_then(|token| lookup(ACCESS_TYPES, token)) {
        Some(label) => label,
        None => {
            tracing::debug!(access_type, "unrecognized access type");
            labels::UNKNOWN
        }
    }
}
