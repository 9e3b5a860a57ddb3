//! Interfaces to the systems the monitor reads from and writes to.
//!
//! Handles implementing these traits are built once at startup and passed
//! explicitly into the poller and dispatcher. They must be safe to share
//! across tasks.

use std::future::Future;

use crate::cursor::Cursor;
use crate::error::{CacheError, NotifyError, StoreError};
use crate::metrics::MetricRow;
use crate::types::DbId;

/// Relational store holding the telemetry table and the alert log.
pub trait MetricStore: Send + Sync {
    /// Rows with an id strictly greater than the cursor, ascending by id.
    ///
    /// The sentinel cursor applies no filter.
    fn fetch_since(
        &self,
        cursor: Cursor,
    ) -> impl Future<Output = Result<Vec<MetricRow>, StoreError>> + Send;

    /// Append an alert record for `device_id`.
    fn insert_alert(
        &self,
        device_id: DbId,
        message: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Key-value store holding the latest alert text per device.
pub trait AlertCache: Send + Sync {
    /// Set `key` to `value` with no expiry.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// Outbound operator notification channel.
pub trait Notifier: Send + Sync {
    /// Deliver `text` to `recipient`. A single attempt; retries are the
    /// caller's business.
    fn send(
        &self,
        recipient: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
