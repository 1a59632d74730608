//! Statement machinery: the AST for the catalog's Cypher-like dialect, a
//! fluent builder for engine-constructed statements, a parser for
//! caller-supplied text, and the executor that runs both against a
//! [`GraphStore`](crate::store::GraphStore).

pub mod ast;
pub mod builder;
pub mod executor;
pub mod parser;

use serde::Serialize;

use crate::model::Value;

pub use ast::{Expr, Statement};
pub use builder::StatementBuilder;
pub use executor::execute;

/// One projected result row: `(column name, value)` pairs in projection
/// order.
pub type Row = Vec<(String, Value)>;

/// Counters describing the effects of a write statement, reported when a
/// statement produces no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Nodes created by `MERGE` clauses.
    pub nodes_created: u64,
    /// Nodes removed by `DELETE` clauses.
    pub nodes_deleted: u64,
    /// Relationships created by `MERGE` clauses.
    pub relationships_created: u64,
    /// Relationships removed, directly or via `DETACH DELETE`.
    pub relationships_deleted: u64,
    /// Properties written or removed by `SET` clauses.
    pub properties_set: u64,
}

impl WriteSummary {
    /// Folds another summary into this one; used by transactions to report
    /// the combined effect of their statements.
    pub fn absorb(&mut self, other: &WriteSummary) {
        self.nodes_created += other.nodes_created;
        self.nodes_deleted += other.nodes_deleted;
        self.relationships_created += other.relationships_created;
        self.relationships_deleted += other.relationships_deleted;
        self.properties_set += other.properties_set;
    }

    /// True when nothing was created, deleted, or written.
    pub fn is_empty(&self) -> bool {
        *self == WriteSummary::default()
    }
}

/// Result of executing one statement: either projected rows (the statement
/// had a `RETURN` clause) or a write summary. The shape is decided by the
/// statement's structure, never by probing for an error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Row-shaped results from a `RETURN` clause.
    Rows(Vec<Row>),
    /// Effect counters from a statement with no `RETURN` clause.
    Summary(WriteSummary),
}

impl QueryOutcome {
    /// Capability check: does this outcome carry row data?
    pub fn has_rows(&self) -> bool {
        matches!(self, QueryOutcome::Rows(_))
    }

    /// Borrows the rows, if any.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            QueryOutcome::Summary(_) => None,
        }
    }

    /// Caller-facing JSON shape: an array of row objects, or a
    /// single-element array holding the write summary when the statement
    /// produced no rows.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            QueryOutcome::Rows(rows) => serde_json::Value::Array(
                rows.iter()
                    .map(|row| {
                        serde_json::Value::Object(
                            row.iter()
                                .map(|(name, value)| (name.clone(), value.to_json()))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            QueryOutcome::Summary(summary) => {
                serde_json::json!([{ "summary": summary }])
            }
        }
    }
}
