//! Raw statement gateway: executes caller-supplied statement text.

use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::model::Params;
use crate::query::{parser, QueryOutcome};

use super::Catalog;

impl Catalog {
    /// Parses and executes an arbitrary statement with named parameters in
    /// one session.
    ///
    /// Blank text is rejected before parsing. The returned outcome is
    /// row-shaped when the statement projects rows and a write summary
    /// otherwise; the shape follows from the statement itself (see
    /// [`QueryOutcome::has_rows`]), so callers get a deterministic response
    /// without probing. There are no retries; a failure surfaces
    /// immediately with the store-reported cause.
    pub fn run_raw(&self, query: &str, params: &Params) -> Result<QueryOutcome> {
        if query.trim().is_empty() {
            return Err(CatalogError::validation("query text is required"));
        }
        let stmt = parser::parse(query)?;
        debug!(write = stmt.is_write(), "raw statement accepted");
        self.driver().with_session(|s| s.run(&stmt, params))
    }
}
