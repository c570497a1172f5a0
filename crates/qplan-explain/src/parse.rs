//! Dump-level entry points
//!
//! Ties the pipeline together for one uploaded dump:
//! extract fragments, rewrite dialect quirks, decode, build, normalize.
//! A fragment that cannot be decoded fails the whole call, since skipping it
//! would shift the numbering of every later query.

use crate::dialect::Dialect;
use crate::error::{ExplainError, Result};
use crate::extract::{PlanFragment, extract_fragments, json_object_body};
use crate::keys::rename_duplicate_tables;
use crate::normalize::normalize;
use crate::plan::{CanonicalNode, Plan};
use crate::raw::RawNode;
use crate::{mariadb, mysql, postgres};
use serde::Serialize;

/// Caller-supplied flags for one parse call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Wrap each tree with its query number and file index
    pub comparison_mode: bool,
    /// Opaque index of the uploaded file, echoed back in comparison mode
    pub file_index: Option<usize>,
}

impl ParseOptions {
    pub fn comparison(file_index: usize) -> Self {
        Self {
            comparison_mode: true,
            file_index: Some(file_index),
        }
    }
}

/// Result of parsing one dump
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExplainOutput {
    /// Bare trees, one per query
    Trees(Vec<CanonicalNode>),
    /// Plans carrying query number and file index
    Comparison(Vec<Plan>),
}

impl ExplainOutput {
    /// Root nodes in query order, whichever shape the output has
    pub fn trees(&self) -> Vec<&CanonicalNode> {
        match self {
            Self::Trees(trees) => trees.iter().collect(),
            Self::Comparison(plans) => plans.iter().map(|plan| &plan.root).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Trees(trees) => trees.len(),
            Self::Comparison(plans) => plans.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parses a dump into bare trees or comparison plans according to `options`
pub fn parse_explain(
    dump: &str,
    dialect: Dialect,
    options: &ParseOptions,
) -> Result<ExplainOutput> {
    let plans = parse_plans(dump, dialect)?;

    Ok(if options.comparison_mode {
        ExplainOutput::Comparison(
            plans
                .into_iter()
                .map(|plan| plan.with_file_index(options.file_index))
                .collect(),
        )
    } else {
        ExplainOutput::Trees(plans.into_iter().map(|plan| plan.root).collect())
    })
}

/// Parses every query plan of a dump, in source order
///
/// A dump without any plan markers yields an empty list.
#[tracing::instrument(skip(dump), fields(%dialect, len = dump.len()))]
pub fn parse_plans(dump: &str, dialect: Dialect) -> Result<Vec<Plan>> {
    let plans = extract_fragments(dump, dialect)
        .iter()
        .map(|fragment| parse_fragment(fragment, dialect))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(plans = plans.len(), "parsed plans");
    Ok(plans)
}

fn parse_fragment(fragment: &PlanFragment, dialect: Dialect) -> Result<Plan> {
    let query_number = fragment.query_number;
    let document = decode(fragment, dialect)?;

    let missing_root = |key| ExplainError::MissingPlanRoot {
        query_number,
        dialect,
        key,
    };

    let plan = match dialect {
        Dialect::Postgresql => {
            let built = postgres::build_plan(&document).ok_or_else(|| missing_root("Plan"))?;
            let mut plan = Plan::new(query_number, built.root);
            plan.planning_time_ms = built.planning_time_ms;
            plan.execution_time_ms = built.execution_time_ms;
            plan
        }
        Dialect::Mysql => {
            let root = mysql::build_tree(&document).ok_or_else(|| missing_root("query_block"))?;
            Plan::new(query_number, root)
        }
        Dialect::Mariadb => {
            let root = mariadb::build_tree(&document).ok_or_else(|| missing_root("query_block"))?;
            Plan::new(query_number, root)
        }
    };

    Ok(Plan {
        root: normalize(plan.root),
        ..plan
    })
}

/// Applies the dialect's text rewrites and decodes the fragment
fn decode(fragment: &PlanFragment, dialect: Dialect) -> Result<RawNode> {
    let parsed = match dialect {
        Dialect::Postgresql => RawNode::parse(&format!("[{}]", fragment.text)),
        Dialect::Mysql => RawNode::parse(json_object_body(&fragment.text)),
        Dialect::Mariadb => {
            let renamed = rename_duplicate_tables(json_object_body(&fragment.text));
            RawNode::parse(&renamed.text)
        }
    };

    parsed.map_err(|source| {
        tracing::warn!(
            query_number = fragment.query_number,
            %source,
            "failed to decode plan fragment"
        );
        ExplainError::MalformedPlanText {
            query_number: fragment.query_number,
            dialect,
            source,
        }
    })
}
