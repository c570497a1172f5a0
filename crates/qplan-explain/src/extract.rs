//! Plan Extractor - splits a raw dump into one fragment per query
//!
//! - PostgreSQL: psql prints each JSON plan as a bracketed array followed by
//!   a `(N rows)` footer, with `+` line-continuation markers.
//! - MySQL / MariaDB: each plan sits between an `EXPLAIN` or `ANALYZE`
//!   header and a `Query_ID` marker, with escaped newlines and backslashes.
//!
//! Fragments are returned in source order; a dump with no markers yields an
//! empty list rather than an error.

use crate::dialect::Dialect;
use regex::Regex;
use std::sync::LazyLock;

static POSTGRES_PLAN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[(.*?)\]\s*\(").expect("valid regex"));

static MYSQL_PLAN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:EXPLAIN|ANALYZE)(.*?)Query_ID").expect("valid regex")
});

/// The raw plan text of one query within a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFragment {
    /// 1-based position of the query within the dump
    pub query_number: usize,
    /// Plan text with the dialect's string-level escapes already removed
    pub text: String,
}

/// Extracts the plan fragments of every query in `dump`, in source order
pub fn extract_fragments(dump: &str, dialect: Dialect) -> Vec<PlanFragment> {
    let fragments: Vec<String> = match dialect {
        Dialect::Postgresql => POSTGRES_PLAN_REGEX
            .captures_iter(dump)
            .map(|caps| strip_continuations(&caps[1]))
            .collect(),
        Dialect::Mysql | Dialect::Mariadb => MYSQL_PLAN_REGEX
            .captures_iter(dump)
            .map(|caps| strip_escapes(&caps[1]))
            .collect(),
    };

    tracing::debug!(%dialect, fragments = fragments.len(), "extracted plan fragments");

    fragments
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlanFragment {
            query_number: i + 1,
            text,
        })
        .collect()
}

/// Removes psql's `+` line-continuation markers
fn strip_continuations(text: &str) -> String {
    text.replace('+', "")
}

/// Removes escaped newlines first, then every remaining backslash
fn strip_escapes(text: &str) -> String {
    text.replace("\\n", "").replace('\\', "")
}

/// Slices the outermost JSON object out of a MySQL-family fragment
///
/// Console output may surround the JSON cell with a `:` or table borders.
/// Without any braces the trimmed text is returned so decoding reports it.
pub(crate) fn json_object_body(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}
