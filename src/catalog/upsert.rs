//! Idempotent multi-entity upsert for adding a book and its relationships.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::model::{Params, Value};
use crate::query::ast::{param, NodePattern, PathPattern};
use crate::query::{Statement, StatementBuilder};

use super::{Catalog, UpsertReceipt};

/// Arguments for [`Catalog::add_book`]. Title, author, and at least one
/// genre are required; the rest is optional and only ever written when
/// supplied.
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    /// Book title, the node's identity.
    pub title: String,
    /// Author name; the book is linked to exactly this author.
    pub author: String,
    /// Genre names. Entries are trimmed, empties dropped, order preserved,
    /// duplicates tolerated.
    pub genres: Vec<String>,
    /// Publisher name; blank counts as absent.
    pub publisher: Option<String>,
    /// Publication year.
    pub year: Option<i64>,
    /// Page count.
    pub pages: Option<i64>,
}

impl Catalog {
    /// Splits a comma-separated genre string the way the request shell
    /// does: trimmed, empties discarded, order preserved.
    pub fn split_genres(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Upserts a book together with its author, genres, and optional
    /// publisher, atomically.
    ///
    /// Every entity uses match-or-create semantics keyed on its identity
    /// property, and every relationship is merged, so repeating a call
    /// changes nothing. Book attributes follow one policy on every path:
    /// supplied attributes overwrite, absent attributes are left untouched.
    /// Any failure rolls the whole transaction back.
    pub fn add_book(&self, book: &NewBook) -> Result<UpsertReceipt> {
        let title = book.title.trim();
        if title.is_empty() {
            return Err(CatalogError::validation("title is required"));
        }
        let author = book.author.trim();
        if author.is_empty() {
            return Err(CatalogError::validation("author is required"));
        }
        let genres: Vec<&str> = book
            .genres
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect();
        if genres.is_empty() {
            return Err(CatalogError::validation("at least one genre is required"));
        }
        let publisher = book
            .publisher
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let mut props = BTreeMap::new();
        if let Some(year) = book.year {
            props.insert("year".to_owned(), Value::Int(year));
        }
        if let Some(pages) = book.pages {
            props.insert("pages".to_owned(), Value::Int(pages));
        }

        let summary = self.driver().with_transaction(|tx| {
            let mut params = Params::new();
            params.insert("title".into(), title.into());
            params.insert("author".into(), author.into());
            params.insert("props".into(), Value::Map(props.clone()));

            tx.run(&merge_author()?, &params)?;
            if let Some(publisher) = publisher {
                params.insert("publisher".into(), publisher.into());
                tx.run(&merge_publisher()?, &params)?;
            }
            tx.run(&merge_book(!props.is_empty())?, &params)?;
            tx.run(&link_author()?, &params)?;
            for genre in &genres {
                params.insert("genre".into(), (*genre).into());
                tx.run(&link_genre()?, &params)?;
            }
            if publisher.is_some() {
                tx.run(&link_publisher()?, &params)?;
            }
            Ok(tx.summary())
        })?;

        if summary.is_empty() {
            debug!(title, "add_book repeated, no graph changes");
        } else {
            info!(
                title,
                nodes_created = summary.nodes_created,
                relationships_created = summary.relationships_created,
                "book upserted"
            );
        }
        Ok(UpsertReceipt {
            title: title.to_owned(),
            summary,
        })
    }
}

// The statement shapes below mirror the six upsert steps.

fn merge_author() -> Result<Statement> {
    StatementBuilder::new()
        .merge(PathPattern::node(
            NodePattern::labeled("a", "Author").prop("name", param("author")),
        ))
        .build()
}

fn merge_publisher() -> Result<Statement> {
    StatementBuilder::new()
        .merge(PathPattern::node(
            NodePattern::labeled("p", "Publisher").prop("name", param("publisher")),
        ))
        .build()
}

fn merge_book(with_props: bool) -> Result<Statement> {
    let builder = StatementBuilder::new().merge(PathPattern::node(
        NodePattern::labeled("b", "Book").prop("title", param("title")),
    ));
    let builder = if with_props {
        builder.set_merge("b", param("props"))
    } else {
        builder
    };
    builder.build()
}

fn link_author() -> Result<Statement> {
    StatementBuilder::new()
        .match_pattern(PathPattern::node(
            NodePattern::labeled("a", "Author").prop("name", param("author")),
        ))
        .match_pattern(PathPattern::node(
            NodePattern::labeled("b", "Book").prop("title", param("title")),
        ))
        .merge(PathPattern::node(NodePattern::var("a")).out("WROTE", NodePattern::var("b")))
        .build()
}

fn link_genre() -> Result<Statement> {
    StatementBuilder::new()
        .match_pattern(PathPattern::node(
            NodePattern::labeled("b", "Book").prop("title", param("title")),
        ))
        .merge(PathPattern::node(
            NodePattern::labeled("g", "Genre").prop("name", param("genre")),
        ))
        .merge(PathPattern::node(NodePattern::var("b")).out("HAS_GENRE", NodePattern::var("g")))
        .build()
}

fn link_publisher() -> Result<Statement> {
    StatementBuilder::new()
        .match_pattern(PathPattern::node(
            NodePattern::labeled("b", "Book").prop("title", param("title")),
        ))
        .match_pattern(PathPattern::node(
            NodePattern::labeled("p", "Publisher").prop("name", param("publisher")),
        ))
        .merge(PathPattern::node(NodePattern::var("b")).out("PUBLISHED_BY", NodePattern::var("p")))
        .build()
}
