//! Repository for the `device_alerts` table.

use devwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::device_alert::DeviceAlert;

const COLUMNS: &str = "id, device_id, message, created_at";

/// Provides query operations for device alerts.
pub struct DeviceAlertRepo;

impl DeviceAlertRepo {
    /// Record an alert for a device. Returns the new row id.
    pub async fn insert(pool: &PgPool, device_id: DbId, message: &str) -> Result<DbId, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO device_alerts (device_id, message) VALUES ($1, $2) RETURNING id",
        )
        .bind(device_id)
        .bind(message)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// All alerts recorded for a device, oldest first.
    pub async fn list_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Vec<DeviceAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM device_alerts \
             WHERE device_id = $1 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, DeviceAlert>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }
}
