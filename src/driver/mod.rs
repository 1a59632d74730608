//! Graph store adapter: connection lifecycle, scoped sessions, and
//! transactions over the embedded store.
//!
//! A [`Driver`] either holds a live store or is degraded. A degraded driver
//! is still a usable object; every operation on it fails fast with
//! [`CatalogError::Unavailable`] instead of attempting a connection per
//! call, which is how a shell keeps serving when the store was unreachable
//! at startup.

mod config;
mod session;

pub use config::{Config, Credentials};
pub use session::{Session, Transaction, TxState};

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::store::{snapshot, GraphStore};

/// Where committed state goes.
#[derive(Debug, Clone)]
pub(crate) enum Backend {
    /// State lives only in memory.
    Memory,
    /// State is mirrored to a JSON snapshot after every committed write.
    File(PathBuf),
}

pub(crate) struct Shared {
    pub(crate) store: Arc<RwLock<GraphStore>>,
    pub(crate) backend: Backend,
    active_sessions: AtomicUsize,
    max_sessions: usize,
}

impl Shared {
    /// Persists the current store state for file backends; a no-op for
    /// memory backends.
    pub(crate) fn persist(&self, store: &GraphStore) -> Result<()> {
        match &self.backend {
            Backend::Memory => Ok(()),
            Backend::File(path) => snapshot::save(store, path),
        }
    }

    pub(crate) fn release_session(&self) {
        self.active_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to an attached (or unreachable) graph store.
pub struct Driver {
    state: State,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Live(shared) => f
                .debug_struct("Driver")
                .field("backend", &shared.backend)
                .finish_non_exhaustive(),
            State::Degraded(reason) => f
                .debug_struct("Driver")
                .field("degraded", reason)
                .finish(),
        }
    }
}

enum State {
    Live(Arc<Shared>),
    Degraded(String),
}

impl Driver {
    /// Attaches to the store named by the config URI.
    ///
    /// `memory:` creates an empty ephemeral store. `file:<path>` loads the
    /// snapshot at `path` (an absent file starts empty). Any other scheme
    /// is a connection error.
    pub fn connect(config: &Config) -> Result<Driver> {
        let backend = parse_uri(&config.uri)?;
        let store = match &backend {
            Backend::Memory => GraphStore::new(),
            Backend::File(path) => snapshot::load(path)
                .map_err(|err| CatalogError::Connection(err.to_string()))?,
        };
        info!(
            uri = %config.uri,
            nodes = store.node_count(None),
            edges = store.edge_count(),
            "store attached"
        );
        Ok(Driver {
            state: State::Live(Arc::new(Shared {
                store: Arc::new(RwLock::new(store)),
                backend,
                active_sessions: AtomicUsize::new(0),
                max_sessions: config.max_sessions.max(1),
            })),
        })
    }

    /// Connects, or degrades with a logged warning instead of failing. The
    /// returned driver keeps the process serving; operations report
    /// [`CatalogError::Unavailable`] until it is replaced.
    pub fn connect_or_degraded(config: &Config) -> Driver {
        match Driver::connect(config) {
            Ok(driver) => driver,
            Err(err) => {
                warn!(uri = %config.uri, error = %err, "store unreachable, driver degraded");
                Driver::degraded(err.to_string())
            }
        }
    }

    /// A driver with no store behind it.
    pub fn degraded(reason: impl Into<String>) -> Driver {
        Driver {
            state: State::Degraded(reason.into()),
        }
    }

    /// True when no live store is attached.
    pub fn is_degraded(&self) -> bool {
        matches!(self.state, State::Degraded(_))
    }

    /// Cheap health probe: takes and releases a read guard on the store.
    pub fn verify_connectivity(&self) -> Result<()> {
        let shared = self.shared()?;
        let _guard = shared.store.read();
        Ok(())
    }

    /// Opens a scoped session, counted against `max_sessions`. Exhaustion
    /// fails fast rather than queueing.
    pub fn session(&self) -> Result<Session> {
        let shared = self.shared()?;
        let claimed = shared
            .active_sessions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < shared.max_sessions).then_some(n + 1)
            });
        if claimed.is_err() {
            return Err(CatalogError::Unavailable(format!(
                "session pool exhausted ({} active)",
                shared.max_sessions
            )));
        }
        Ok(Session::new(Arc::clone(shared)))
    }

    /// Runs `f` with a scoped session, releasing it on every exit path.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut session = self.session()?;
        f(&mut session)
    }

    /// Runs `f` inside one transaction: commit on `Ok`, rollback on `Err`.
    /// A rolled-back failure is reported as
    /// [`CatalogError::TransactionAborted`] wrapping the cause.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&mut Transaction) -> Result<T>) -> Result<T> {
        let mut session = self.session()?;
        let mut tx = session.begin()?;
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "unit of work failed, rolling back");
                tx.rollback();
                Err(CatalogError::TransactionAborted {
                    source: Box::new(err),
                })
            }
        }
    }

    fn shared(&self) -> Result<&Arc<Shared>> {
        match &self.state {
            State::Live(shared) => Ok(shared),
            State::Degraded(reason) => Err(CatalogError::Unavailable(reason.clone())),
        }
    }
}

fn parse_uri(uri: &str) -> Result<Backend> {
    if uri == "memory:" || uri == "memory://" {
        return Ok(Backend::Memory);
    }
    if let Some(path) = uri.strip_prefix("file:") {
        let path = path.strip_prefix("//").unwrap_or(path);
        if path.is_empty() {
            return Err(CatalogError::Connection(
                "file: URI requires a path".into(),
            ));
        }
        return Ok(Backend::File(PathBuf::from(path)));
    }
    Err(CatalogError::Connection(format!(
        "unsupported URI scheme: {uri}"
    )))
}
