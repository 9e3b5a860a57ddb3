//! Incremental fetch cursor.
//!
//! The cursor remembers the highest row id handed downstream. It starts at
//! a sentinel ("nothing fetched yet", meaning no filter) and only ever moves
//! forward. It lives in memory only; a restart begins from the sentinel again
//! unless an explicit starting id is configured.

use std::fmt;

use crate::error::CoreError;
use crate::metrics::MetricRow;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    last_seen: Option<DbId>,
}

impl Cursor {
    /// The sentinel cursor: the next fetch returns the whole table.
    pub fn start() -> Self {
        Self::default()
    }

    /// A cursor positioned after `id`; the next fetch returns rows with a
    /// strictly greater id.
    pub fn after(id: DbId) -> Result<Self, CoreError> {
        if id < 0 {
            return Err(CoreError::Validation(format!(
                "cursor start id must be non-negative, got {id}"
            )));
        }
        Ok(Self { last_seen: Some(id) })
    }

    /// The highest id already observed, or `None` for the sentinel.
    pub fn last_seen(&self) -> Option<DbId> {
        self.last_seen
    }

    /// Move the cursor to the highest id in `batch`.
    ///
    /// An empty batch leaves the cursor untouched, and the cursor never moves
    /// backwards even if the batch contains ids below it.
    pub fn advance(&mut self, batch: &[MetricRow]) {
        let Some(max_id) = batch.iter().map(|row| row.id).max() else {
            return;
        };
        self.last_seen = Some(self.last_seen.map_or(max_id, |seen| seen.max(max_id)));
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_seen {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("start"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
