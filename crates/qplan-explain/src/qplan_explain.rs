//! QPLAN Explain - EXPLAIN plan normalization
//!
//! This crate turns EXPLAIN / ANALYZE dumps from PostgreSQL, MySQL and
//! MariaDB into one canonical plan tree for hierarchical visualization:
//! - Splitting a multi-query dump into per-query plan fragments
//! - Rewriting MariaDB's duplicated `table` keys before JSON decoding
//! - Classifying raw operators and access types into canonical labels
//! - Rebuilding join, subquery and sort structure as an ordered tree
//!
//! # Example
//!
//! ```
//! use qplan_explain::{Dialect, ParseOptions, parse_explain};
//!
//! let dump = r#"EXPLAIN {"query_block": {"select_id": 1, "table": {"table_name": "users", "access_type": "ALL"}}} Query_ID"#;
//! let output = parse_explain(dump, Dialect::Mysql, &ParseOptions::default()).unwrap();
//! let trees = output.trees();
//! assert_eq!(trees[0].children[0].node_type, "Full Table Scan");
//! ```

pub mod classify;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod join;
pub mod keys;
pub mod lookup;
pub mod mariadb;
pub mod mysql;
pub mod normalize;
pub mod parse;
pub mod plan;
pub mod postgres;
pub mod raw;

pub use dialect::Dialect;
pub use error::{ExplainError, Result};
pub use extract::{PlanFragment, extract_fragments};
pub use lookup::labels;
pub use normalize::normalize;
pub use parse::{ExplainOutput, ParseOptions, parse_explain, parse_plans};
pub use plan::{CanonicalNode, NodeIter, Plan};
pub use raw::{Mapping, RawNode};
