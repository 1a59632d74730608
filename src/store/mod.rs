//! Embedded labeled-property graph store.
//!
//! The store is a plain in-memory structure; durability is layered on top by
//! [`snapshot`] and orchestrated by the driver, which persists a snapshot on
//! every committed write transaction.

mod graph;
pub mod snapshot;

pub use graph::GraphStore;
