//! Device telemetry rows as seen by the monitor.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Number of metric slots carried by every telemetry row.
pub const METRIC_SLOTS: usize = 5;

/// One polled observation from the `device_metrics` table.
///
/// Rows are immutable once fetched. `id` is assigned by the store and
/// strictly increases in fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub id: DbId,
    pub device_id: DbId,
    /// `metric_1` .. `metric_5`, in slot order.
    pub metrics: [i32; METRIC_SLOTS],
    /// Server-side capture time.
    pub server_time: Timestamp,
}

impl MetricRow {
    /// The cache key for this row's device (its decimal string form).
    pub fn device_key(&self) -> String {
        self.device_id.to_string()
    }
}
