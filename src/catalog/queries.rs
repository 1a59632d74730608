//! Read-only traversal queries: recommendations, the full catalog dump,
//! name listings, label counts, and the top-N rankings.

use tracing::warn;

use crate::error::{CatalogError, Result};
use crate::model::{Params, Value};
use crate::query::ast::{param, prop, var, Expr, NodePattern, PathPattern};
use crate::query::{Row, StatementBuilder, WriteSummary};

use super::{AuthorRank, BookEntry, Catalog, CatalogDump, EntityKind, GenreRank, Recommendation};

/// Hard cap on recommendation results.
const RECOMMENDATION_LIMIT: u64 = 10;

/// Author values meaning "any author", matched case-insensitively.
/// "qualquer" is the localized form accepted by the original service.
const ANY_AUTHOR: [&str; 2] = ["any", "qualquer"];

/// Marker for an authorless book in a recommendation row.
const UNKNOWN_AUTHOR: &str = "Unknown";
/// Marker for a missing year or page count.
const NOT_APPLICABLE: &str = "N/A";

fn is_any_author(author: &str) -> bool {
    ANY_AUTHOR.iter().any(|s| author.eq_ignore_ascii_case(s))
}

/// Column lookup by name; null for a column the row does not carry.
fn column(row: &Row, name: &str) -> Value {
    row.iter()
        .find(|(col, _)| col == name)
        .map(|(_, value)| value.clone())
        .unwrap_or(Value::Null)
}

fn string_column(row: &Row, name: &str) -> Option<String> {
    match column(row, name) {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn int_column(row: &Row, name: &str) -> Option<i64> {
    column(row, name).as_int()
}

fn string_list(value: Value) -> Vec<String> {
    match value {
        Value::List(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn marker(value: Value) -> String {
    match value {
        Value::Null => NOT_APPLICABLE.to_owned(),
        other => other.to_string(),
    }
}

impl Catalog {
    /// Books matching a genre substring, optionally restricted by an author
    /// substring; both matches are case-insensitive. `None`, a blank
    /// string, or an "any" sentinel for `author` means no author
    /// restriction, and authorless books are then reported with an
    /// "Unknown" author. At most ten rows, store order.
    pub fn recommend(&self, genre: &str, author: Option<&str>) -> Result<Vec<Recommendation>> {
        let genre = genre.trim();
        if genre.is_empty() {
            return Err(CatalogError::validation("genre is required"));
        }
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty() && !is_any_author(a));

        let mut params = Params::new();
        params.insert("genre".into(), genre.into());
        let builder = StatementBuilder::new()
            .match_pattern(
                PathPattern::node(NodePattern::labeled("b", "Book"))
                    .out("HAS_GENRE", NodePattern::labeled("g", "Genre")),
            )
            .filter(prop("g", "name").lower().contains(param("genre").lower()));
        let builder = match author {
            Some(author) => {
                params.insert("author".into(), author.into());
                builder
                    .match_pattern(
                        PathPattern::node(NodePattern::labeled("a", "Author"))
                            .out("WROTE", NodePattern::var("b")),
                    )
                    .filter(prop("a", "name").lower().contains(param("author").lower()))
            }
            None => builder.optional_match(
                PathPattern::node(NodePattern::labeled("a", "Author"))
                    .out("WROTE", NodePattern::var("b")),
            ),
        };
        let stmt = builder
            .returning([
                (prop("b", "title"), "title"),
                (prop("a", "name"), "author"),
                (prop("g", "name"), "genre"),
                (prop("b", "year"), "year"),
                (prop("b", "pages"), "pages"),
            ])
            .limit(RECOMMENDATION_LIMIT)
            .build()?;

        let outcome = self.driver().with_session(|s| s.run(&stmt, &params))?;
        let rows = outcome.rows().unwrap_or_default();
        Ok(rows
            .iter()
            .map(|row| Recommendation {
                title: string_column(row, "title").unwrap_or_default(),
                author: string_column(row, "author")
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned()),
                genre: string_column(row, "genre").unwrap_or_default(),
                year: marker(column(row, "year")),
                pages: marker(column(row, "pages")),
            })
            .collect())
    }

    /// Every book with its related entities aggregated and deduplicated,
    /// ordered by title ascending.
    pub fn dump(&self) -> Result<CatalogDump> {
        let stmt = StatementBuilder::new()
            .match_pattern(PathPattern::node(NodePattern::labeled("b", "Book")))
            .optional_match(
                PathPattern::node(NodePattern::labeled("a", "Author"))
                    .out("WROTE", NodePattern::var("b")),
            )
            .optional_match(
                PathPattern::node(NodePattern::var("b"))
                    .out("HAS_GENRE", NodePattern::labeled("g", "Genre")),
            )
            .optional_match(
                PathPattern::node(NodePattern::var("b"))
                    .out("PUBLISHED_BY", NodePattern::labeled("p", "Publisher")),
            )
            .returning([
                (prop("b", "title"), "title"),
                (collect_distinct(prop("a", "name")), "authors"),
                (collect_distinct(prop("g", "name")), "genres"),
                (collect_distinct(prop("p", "name")), "publishers"),
                (prop("b", "year"), "year"),
                (prop("b", "pages"), "pages"),
            ])
            .order_by("title", false)
            .build()?;

        let outcome = self.driver().with_session(|s| s.run(&stmt, &Params::new()))?;
        let rows = outcome.rows().unwrap_or_default();
        let books: Vec<BookEntry> = rows
            .iter()
            .map(|row| BookEntry {
                title: string_column(row, "title").unwrap_or_default(),
                authors: string_list(column(row, "authors")),
                genres: string_list(column(row, "genres")),
                publishers: string_list(column(row, "publishers")),
                year: int_column(row, "year"),
                pages: int_column(row, "pages"),
            })
            .collect();
        Ok(CatalogDump {
            total_books: books.len() as u64,
            books,
        })
    }

    /// All genre names, ascending.
    pub fn genres(&self) -> Result<Vec<String>> {
        self.list_names(EntityKind::Genre)
    }

    /// All author names, ascending.
    pub fn authors(&self) -> Result<Vec<String>> {
        self.list_names(EntityKind::Author)
    }

    fn list_names(&self, kind: EntityKind) -> Result<Vec<String>> {
        let stmt = StatementBuilder::new()
            .match_pattern(PathPattern::node(NodePattern::labeled("n", kind.label())))
            .returning([(prop("n", "name"), "name")])
            .distinct()
            .order_by("name", false)
            .build()?;
        let outcome = self.driver().with_session(|s| s.run(&stmt, &Params::new()))?;
        let rows = outcome.rows().unwrap_or_default();
        Ok(rows
            .iter()
            .filter_map(|row| string_column(row, "name"))
            .collect())
    }

    /// Number of nodes carrying the given label. Advisory: any failure,
    /// including an unreachable store, degrades to zero with a logged
    /// warning instead of propagating.
    pub fn count(&self, kind: EntityKind) -> u64 {
        match self.try_count(kind) {
            Ok(count) => count,
            Err(err) => {
                warn!(label = kind.label(), error = %err, "count degraded to zero");
                0
            }
        }
    }

    fn try_count(&self, kind: EntityKind) -> Result<u64> {
        let stmt = StatementBuilder::new()
            .match_pattern(PathPattern::node(NodePattern::labeled("n", kind.label())))
            .returning([(count_of(var("n")), "total")])
            .build()?;
        let outcome = self.driver().with_session(|s| s.run(&stmt, &Params::new()))?;
        let rows = outcome.rows().unwrap_or_default();
        Ok(rows
            .first()
            .and_then(|row| int_column(row, "total"))
            .unwrap_or(0) as u64)
    }

    /// Authors ranked descending by number of WROTE relationships.
    pub fn top_authors(&self, limit: u64) -> Result<Vec<AuthorRank>> {
        let stmt = StatementBuilder::new()
            .match_pattern(
                PathPattern::node(NodePattern::labeled("a", "Author"))
                    .out("WROTE", NodePattern::labeled("b", "Book")),
            )
            .returning([
                (prop("a", "name"), "author"),
                (count_of(var("b")), "book_count"),
            ])
            .order_by("book_count", true)
            .limit(limit)
            .build()?;
        let outcome = self.driver().with_session(|s| s.run(&stmt, &Params::new()))?;
        let rows = outcome.rows().unwrap_or_default();
        Ok(rows
            .iter()
            .map(|row| AuthorRank {
                author: string_column(row, "author").unwrap_or_default(),
                book_count: int_column(row, "book_count").unwrap_or(0),
            })
            .collect())
    }

    /// Genres ranked descending by number of HAS_GENRE relationships.
    pub fn top_genres(&self, limit: u64) -> Result<Vec<GenreRank>> {
        let stmt = StatementBuilder::new()
            .match_pattern(
                PathPattern::node(NodePattern::labeled("b", "Book"))
                    .out("HAS_GENRE", NodePattern::labeled("g", "Genre")),
            )
            .returning([
                (prop("g", "name"), "genre"),
                (count_of(var("b")), "book_count"),
            ])
            .order_by("book_count", true)
            .limit(limit)
            .build()?;
        let outcome = self.driver().with_session(|s| s.run(&stmt, &Params::new()))?;
        let rows = outcome.rows().unwrap_or_default();
        Ok(rows
            .iter()
            .map(|row| GenreRank {
                genre: string_column(row, "genre").unwrap_or_default(),
                book_count: int_column(row, "book_count").unwrap_or(0),
            })
            .collect())
    }

    /// Detach-deletes every node and relationship. Irreversible.
    pub fn clear(&self) -> Result<WriteSummary> {
        let stmt = StatementBuilder::new()
            .match_pattern(PathPattern::node(NodePattern::var("n")))
            .detach_delete(["n"])
            .build()?;
        let outcome = self.driver().with_session(|s| s.run(&stmt, &Params::new()))?;
        match outcome {
            crate::query::QueryOutcome::Summary(summary) => Ok(summary),
            crate::query::QueryOutcome::Rows(_) => Ok(WriteSummary::default()),
        }
    }
}

fn collect_distinct(expr: Expr) -> Expr {
    Expr::Collect {
        distinct: true,
        expr: Box::new(expr),
    }
}

fn count_of(expr: Expr) -> Expr {
    Expr::Count {
        distinct: false,
        expr: Box::new(expr),
    }
}
