//! Errors surfaced to callers of the plan normalizer
//!
//! Only two situations are fatal: a dialect name that is not supported, and a
//! located plan fragment that cannot be decoded. Unknown operator tokens and
//! missing join members degrade the tree shape instead of failing.

use crate::dialect::Dialect;
use thiserror::Error;

/// Errors that can occur when normalizing EXPLAIN output
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Unrecognized dialect `{0}`: expected postgresql, mysql or mariadb")]
    UnrecognizedDialect(String),

    #[error("Query {query_number}: malformed {dialect} plan text: {source}")]
    MalformedPlanText {
        query_number: usize,
        dialect: Dialect,
        #[source]
        source: serde_json::Error,
    },

    #[error("Query {query_number}: {dialect} plan has no `{key}` object")]
    MissingPlanRoot {
        query_number: usize,
        dialect: Dialect,
        key: &'static str,
    },
}

impl ExplainError {
    /// Returns the 1-based query position that failed, if the error is tied to one
    pub fn query_number(&self) -> Option<usize> {
        match self {
            Self::UnrecognizedDialect(_) => None,
            Self::MalformedPlanText { query_number, .. }
            | Self::MissingPlanRoot { query_number, .. } => Some(*query_number),
        }
    }
}

/// Result type for plan normalization
pub type Result<T> = std::result::Result<T, ExplainError>;
