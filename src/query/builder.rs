//! Fluent statement builder used by the engine-side callers.
//!
//! The catalog engines never concatenate statement text; they assemble the
//! AST through this builder and hand it to a session. Errors (such as a
//! `WHERE` with no preceding `MATCH`) are latched and surface at
//! [`StatementBuilder::build`].

use crate::error::{CatalogError, Result};
use crate::query::ast::{
    Clause, Expr, OrderKey, PathPattern, Projection, ReturnClause, Statement,
};

/// Builder accumulating clauses in execution order.
#[derive(Default)]
pub struct StatementBuilder {
    clauses: Vec<Clause>,
    returned: bool,
    error: Option<CatalogError>,
}

impl StatementBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `MATCH` clause.
    pub fn match_pattern(mut self, pattern: PathPattern) -> Self {
        self.push(Clause::Match {
            optional: false,
            pattern,
            filter: None,
        });
        self
    }

    /// Adds an `OPTIONAL MATCH` clause.
    pub fn optional_match(mut self, pattern: PathPattern) -> Self {
        self.push(Clause::Match {
            optional: true,
            pattern,
            filter: None,
        });
        self
    }

    /// Attaches a `WHERE` predicate to the preceding `MATCH` or `WITH`.
    pub fn filter(mut self, expr: Expr) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.clauses.last_mut() {
            Some(Clause::Match { filter, .. }) | Some(Clause::With { filter, .. }) => {
                *filter = Some(match filter.take() {
                    Some(existing) => existing.and(expr),
                    None => expr,
                });
            }
            _ => {
                self.error = Some(CatalogError::Syntax(
                    "WHERE requires a preceding MATCH or WITH".into(),
                ));
            }
        }
        self
    }

    /// Adds a `WITH var, ...` clause.
    pub fn with_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::With {
            vars: vars.into_iter().map(Into::into).collect(),
            filter: None,
        });
        self
    }

    /// Adds a `MERGE` clause.
    pub fn merge(mut self, pattern: PathPattern) -> Self {
        self.push(Clause::Merge(pattern));
        self
    }

    /// Adds `SET var += expr`.
    pub fn set_merge(mut self, var: impl Into<String>, value: Expr) -> Self {
        self.push(Clause::SetMerge {
            var: var.into(),
            value,
        });
        self
    }

    /// Adds `SET var.key = expr`.
    pub fn set(mut self, var: impl Into<String>, key: impl Into<String>, value: Expr) -> Self {
        self.push(Clause::SetProperty {
            var: var.into(),
            key: key.into(),
            value,
        });
        self
    }

    /// Adds `DETACH DELETE var, ...`.
    pub fn detach_delete<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::Delete {
            detach: true,
            vars: vars.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds the final `RETURN` clause from `(expr, alias)` pairs.
    pub fn returning<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (Expr, &'static str)>,
    {
        let items = items
            .into_iter()
            .map(|(expr, alias)| Projection {
                expr,
                alias: Some(alias.to_owned()),
            })
            .collect();
        self.push(Clause::Return(ReturnClause {
            items,
            ..ReturnClause::default()
        }));
        self.returned = true;
        self
    }

    /// Marks the `RETURN` clause as `DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.with_return(|ret| ret.distinct = true);
        self
    }

    /// Appends an `ORDER BY` key referencing a projected column.
    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.with_return(|ret| {
            ret.order_by.push(OrderKey {
                expr: Expr::Var(column.to_owned()),
                descending,
            })
        });
        self
    }

    /// Caps the number of returned rows.
    pub fn limit(mut self, limit: u64) -> Self {
        self.with_return(|ret| ret.limit = Some(limit));
        self
    }

    /// Finishes the statement, surfacing any latched builder error.
    pub fn build(self) -> Result<Statement> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Statement {
            clauses: self.clauses,
        })
    }

    fn push(&mut self, clause: Clause) {
        if self.error.is_some() {
            return;
        }
        if self.returned {
            self.error = Some(CatalogError::Syntax(
                "RETURN must be the final clause".into(),
            ));
            return;
        }
        self.clauses.push(clause);
    }

    fn with_return(&mut self, apply: impl FnOnce(&mut ReturnClause)) {
        if self.error.is_some() {
            return;
        }
        match self.clauses.last_mut() {
            Some(Clause::Return(ret)) => apply(ret),
            _ => {
                self.error = Some(CatalogError::Syntax(
                    "ORDER BY / LIMIT / DISTINCT require a RETURN clause".into(),
                ));
            }
        }
    }
}
