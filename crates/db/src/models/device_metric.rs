//! `device_metrics` rows (append-only telemetry).

use devwatch_core::types::{DbId, Timestamp};
use devwatch_core::MetricRow;
use serde::Serialize;
use sqlx::FromRow;

/// A single telemetry row as stored in `device_metrics`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceMetric {
    pub id: DbId,
    pub device_id: DbId,
    pub metric_1: i32,
    pub metric_2: i32,
    pub metric_3: i32,
    pub metric_4: i32,
    pub metric_5: i32,
    pub server_time: Timestamp,
}

/// DTO for inserting a telemetry row. Only used by tests and tooling; the
/// monitor itself never writes to `device_metrics`.
#[derive(Debug, Clone)]
pub struct CreateDeviceMetric {
    pub device_id: DbId,
    pub metrics: [i32; 5],
    /// `None` lets the database stamp `now()`.
    pub server_time: Option<Timestamp>,
}

impl From<DeviceMetric> for MetricRow {
    fn from(row: DeviceMetric) -> Self {
        Self {
            id: row.id,
            device_id: row.device_id,
            metrics: [
                row.metric_1,
                row.metric_2,
                row.metric_3,
                row.metric_4,
                row.metric_5,
            ],
            server_time: row.server_time,
        }
    }
}
