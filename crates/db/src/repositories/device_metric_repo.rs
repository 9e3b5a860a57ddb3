//! Repository for the `device_metrics` table (append-only time-series).

use devwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::device_metric::{CreateDeviceMetric, DeviceMetric};

/// Column list for `device_metrics` SELECT queries.
const COLUMNS: &str = "\
    id, device_id, \
    metric_1, metric_2, metric_3, metric_4, metric_5, \
    server_time";

/// Provides query operations for device metrics.
pub struct DeviceMetricRepo;

impl DeviceMetricRepo {
    /// Fetch rows appended after `after_id`, ascending by id.
    ///
    /// `None` fetches the whole table.
    pub async fn fetch_after(
        pool: &PgPool,
        after_id: Option<DbId>,
    ) -> Result<Vec<DeviceMetric>, sqlx::Error> {
        match after_id {
            Some(after_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM device_metrics \
                     WHERE id > $1 \
                     ORDER BY id ASC"
                );
                sqlx::query_as::<_, DeviceMetric>(&query)
                    .bind(after_id)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM device_metrics ORDER BY id ASC");
                sqlx::query_as::<_, DeviceMetric>(&query)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Insert a telemetry row and return it with its assigned id.
    pub async fn insert(
        pool: &PgPool,
        metric: &CreateDeviceMetric,
    ) -> Result<DeviceMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO device_metrics \
                (device_id, metric_1, metric_2, metric_3, metric_4, metric_5, server_time) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now())) \
             RETURNING {COLUMNS}"
        );
        let [m1, m2, m3, m4, m5] = metric.metrics;
        sqlx::query_as::<_, DeviceMetric>(&query)
            .bind(metric.device_id)
            .bind(m1)
            .bind(m2)
            .bind(m3)
            .bind(m4)
            .bind(m5)
            .bind(metric.server_time)
            .fetch_one(pool)
            .await
    }
}
