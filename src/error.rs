//! Error taxonomy shared by the store, the driver, and the catalog engines.

use std::io;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Everything that can go wrong between a caller and the graph store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The driver never established (or has lost) its store; operations
    /// short-circuit with this before touching anything.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Attaching to the store failed (bad URI scheme, unreadable snapshot).
    #[error("connection failed: {0}")]
    Connection(String),
    /// Caller-supplied arguments violated a documented precondition.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The statement text could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The store rejected or failed a statement mid-execution.
    #[error("statement failed: {0}")]
    Execution(String),
    /// A multi-step write failed partway; the whole transaction rolled back.
    #[error("transaction aborted: {source}")]
    TransactionAborted {
        /// The failure that forced the rollback.
        #[source]
        source: Box<CatalogError>,
    },
    /// Underlying filesystem failure while reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A snapshot file exists but could not be decoded.
    #[error("snapshot corrupt: {0}")]
    Snapshot(String),
}

/// The four failure categories surfaced at the operation boundary.
///
/// Internal variants fold into these when a payload is built for a caller:
/// connection and I/O trouble present as [`ErrorCategory::Unavailable`],
/// syntax and snapshot trouble as [`ErrorCategory::Execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No live store behind the driver.
    Unavailable,
    /// Rejected before any store interaction.
    Validation,
    /// The store failed or refused the statement.
    Execution,
    /// A transactional write was rolled back.
    TransactionAborted,
}

impl ErrorCategory {
    /// Stable lowercase name, used in structured payloads and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Unavailable => "unavailable",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Execution => "execution",
            ErrorCategory::TransactionAborted => "transaction_aborted",
        }
    }
}

impl CatalogError {
    /// Boundary category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::Unavailable(_) | CatalogError::Connection(_) | CatalogError::Io(_) => {
                ErrorCategory::Unavailable
            }
            CatalogError::Validation(_) => ErrorCategory::Validation,
            CatalogError::Syntax(_) | CatalogError::Execution(_) | CatalogError::Snapshot(_) => {
                ErrorCategory::Execution
            }
            CatalogError::TransactionAborted { .. } => ErrorCategory::TransactionAborted,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CatalogError::Validation(msg.into())
    }

    pub(crate) fn execution(msg: impl Into<String>) -> Self {
        CatalogError::Execution(msg.into())
    }
}
