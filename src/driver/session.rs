//! Scoped sessions and transactions.

use std::fmt;
use std::sync::Arc;

use parking_lot::{ArcRwLockWriteGuard, RawRwLock};
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::model::Params;
use crate::query::executor::StoreAccess;
use crate::query::{execute, QueryOutcome, Statement, WriteSummary};
use crate::store::GraphStore;

use super::Shared;

/// A scoped unit of store access. Sessions are cheap, single-threaded
/// handles; each external call gets its own and releases it on drop.
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Executes one statement in auto-commit mode.
    ///
    /// Read statements run under a shared lock. Write statements take the
    /// exclusive lock, and either commit fully (including the snapshot for
    /// file backends) or leave the store untouched.
    pub fn run(&mut self, stmt: &Statement, params: &Params) -> Result<QueryOutcome> {
        if stmt.is_write() {
            let mut guard = self.shared.store.write();
            let backup = guard.clone();
            let outcome = match execute(StoreAccess::Write(&mut guard), stmt, params) {
                Ok(outcome) => outcome,
                Err(err) => {
                    *guard = backup;
                    return Err(err);
                }
            };
            if let Err(err) = self.shared.persist(&guard) {
                *guard = backup;
                return Err(err);
            }
            Ok(outcome)
        } else {
            let guard = self.shared.store.read();
            execute(StoreAccess::Read(&guard), stmt, params)
        }
    }

    /// Opens an explicit transaction. The transaction owns the store's
    /// write lock until it commits, rolls back, or is dropped.
    pub fn begin(&mut self) -> Result<Transaction> {
        let guard = self.shared.store.write_arc();
        let backup = guard.clone();
        debug!("transaction started");
        Ok(Transaction {
            shared: Arc::clone(&self.shared),
            guard: Some(guard),
            backup,
            summary: WriteSummary::default(),
            state: TxState::Active,
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared.release_session();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.shared.backend)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of a [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Accepting statements.
    Active,
    /// Committed; changes are durable.
    Committed,
    /// Rolled back; the store is as it was at `begin`.
    RolledBack,
}

/// An open transaction. All statements run under one exclusive lock scope;
/// commit makes them visible (and durable for file backends) as a unit,
/// rollback restores the pre-transaction state. Dropping an active
/// transaction rolls back.
pub struct Transaction {
    shared: Arc<Shared>,
    guard: Option<ArcRwLockWriteGuard<RawRwLock, GraphStore>>,
    backup: GraphStore,
    summary: WriteSummary,
    state: TxState,
}

impl Transaction {
    /// Executes a statement inside this transaction.
    pub fn run(&mut self, stmt: &Statement, params: &Params) -> Result<QueryOutcome> {
        let guard = self.guard.as_mut().ok_or_else(|| {
            CatalogError::execution("transaction is no longer active")
        })?;
        let outcome = execute(StoreAccess::Write(&mut *guard), stmt, params)?;
        if let QueryOutcome::Summary(summary) = &outcome {
            self.summary.absorb(summary);
        }
        Ok(outcome)
    }

    /// Counters accumulated by the write statements run so far.
    pub fn summary(&self) -> WriteSummary {
        self.summary
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Commits: persists the snapshot for file backends and releases the
    /// lock. A failed snapshot write rolls the transaction back and
    /// reports it as aborted.
    pub fn commit(mut self) -> Result<WriteSummary> {
        let guard = match self.guard.take() {
            Some(guard) => guard,
            None => return Err(CatalogError::execution("transaction is no longer active")),
        };
        if let Err(err) = self.shared.persist(&guard) {
            warn!(error = %err, "snapshot write failed, rolling back transaction");
            let mut guard = guard;
            *guard = std::mem::take(&mut self.backup);
            self.state = TxState::RolledBack;
            // Callers see the same category as any other rolled-back
            // unit of work.
            return Err(CatalogError::TransactionAborted {
                source: Box::new(err),
            });
        }
        self.state = TxState::Committed;
        debug!(
            nodes_created = self.summary.nodes_created,
            relationships_created = self.summary.relationships_created,
            "transaction committed"
        );
        Ok(self.summary)
    }

    /// Discards every change made inside the transaction.
    pub fn rollback(mut self) {
        self.rollback_in_place();
    }

    fn rollback_in_place(&mut self) {
        if let Some(mut guard) = self.guard.take() {
            *guard = std::mem::take(&mut self.backup);
            self.state = TxState::RolledBack;
            debug!("transaction rolled back");
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TxState::Active {
            self.rollback_in_place();
        }
    }
}
