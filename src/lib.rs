//! Acervo: an embedded labeled-property graph engine for book catalogs.
//!
//! Books, authors, genres, and publishers are nodes; WROTE, HAS_GENRE, and
//! PUBLISHED_BY are relationships. The crate provides the store and its
//! snapshot persistence, a driver with scoped sessions and transactions, a
//! Cypher-like statement dialect (builder, parser, executor), and the
//! catalog engines layered on top: idempotent upsert, traversal queries,
//! and a raw statement gateway.

pub mod catalog;
pub mod driver;
pub mod error;
pub mod model;
pub mod query;
pub mod store;

pub use catalog::{Catalog, CatalogDump, EntityKind, NewBook, Recommendation, UpsertReceipt};
pub use driver::{Config, Credentials, Driver, Session, Transaction};
pub use error::{CatalogError, ErrorCategory, Result};
pub use model::{Params, Value};
pub use query::{QueryOutcome, WriteSummary};
pub use store::GraphStore;
