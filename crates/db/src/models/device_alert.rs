//! `device_alerts` rows written by the monitor.

use devwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A persisted alert record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceAlert {
    pub id: DbId,
    pub device_id: DbId,
    pub message: String,
    pub created_at: Timestamp,
}
