//! The catalog engines: idempotent upsert, traversal queries, and the raw
//! statement gateway, all speaking through a [`Driver`].

mod gateway;
mod queries;
mod upsert;

pub use upsert::NewBook;

use serde::Serialize;

use crate::driver::Driver;
use crate::error::Result;
use crate::query::WriteSummary;

/// The four node labels the catalog models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// `Book` nodes, identified by title.
    Book,
    /// `Author` nodes, identified by name.
    Author,
    /// `Genre` nodes, identified by name.
    Genre,
    /// `Publisher` nodes, identified by name.
    Publisher,
}

impl EntityKind {
    /// The node label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Book => "Book",
            EntityKind::Author => "Author",
            EntityKind::Genre => "Genre",
            EntityKind::Publisher => "Publisher",
        }
    }

    /// All four kinds, in statistics display order.
    pub fn all() -> [EntityKind; 4] {
        [
            EntityKind::Book,
            EntityKind::Author,
            EntityKind::Genre,
            EntityKind::Publisher,
        ]
    }
}

/// Confirmation returned by a successful [`Catalog::add_book`].
#[derive(Debug, Clone, Serialize)]
pub struct UpsertReceipt {
    /// Title of the upserted book.
    pub title: String,
    /// Combined effect of the transaction's statements. Empty when the call
    /// was a pure no-op repeat.
    pub summary: WriteSummary,
}

/// One recommendation row. Missing related data carries explicit markers
/// ("Unknown" author, "N/A" year and pages) rather than nulls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Book title.
    pub title: String,
    /// Author name, or "Unknown" for an authorless book.
    pub author: String,
    /// The matched genre name.
    pub genre: String,
    /// Publication year, or "N/A".
    pub year: String,
    /// Page count, or "N/A".
    pub pages: String,
}

/// One entry of the full catalog dump: a book with every related entity
/// aggregated and deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookEntry {
    /// Book title.
    pub title: String,
    /// Distinct author names, store order.
    pub authors: Vec<String>,
    /// Distinct genre names, store order.
    pub genres: Vec<String>,
    /// Distinct publisher names, store order.
    pub publishers: Vec<String>,
    /// Publication year, when stored.
    pub year: Option<i64>,
    /// Page count, when stored.
    pub pages: Option<i64>,
}

/// The full catalog, one entry per book, ordered by title.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogDump {
    /// Number of books in the catalog.
    pub total_books: u64,
    /// The entries, title ascending.
    pub books: Vec<BookEntry>,
}

/// One row of the author ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRank {
    /// Author name.
    pub author: String,
    /// Number of WROTE relationships.
    pub book_count: i64,
}

/// One row of the genre ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreRank {
    /// Genre name.
    pub genre: String,
    /// Number of HAS_GENRE relationships.
    pub book_count: i64,
}

/// The catalog service facade. Owns the driver; every operation acquires
/// its own session or transaction from it.
pub struct Catalog {
    driver: Driver,
}

impl Catalog {
    /// Wraps a driver (live or degraded).
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }

    /// The underlying driver.
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Health probe; [`CatalogError::Unavailable`](crate::CatalogError)
    /// when the driver is degraded.
    pub fn ping(&self) -> Result<()> {
        self.driver.verify_connectivity()
    }
}
