//! [`MetricStore`] backed by the PostgreSQL pool.

use devwatch_core::error::StoreError;
use devwatch_core::types::DbId;
use devwatch_core::{Cursor, MetricRow, MetricStore};

use crate::repositories::{DeviceAlertRepo, DeviceMetricRepo};
use crate::DbPool;

/// Production metric store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgMetricStore {
    pool: DbPool,
}

impl PgMetricStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl MetricStore for PgMetricStore {
    async fn fetch_since(&self, cursor: Cursor) -> Result<Vec<MetricRow>, StoreError> {
        let rows = DeviceMetricRepo::fetch_after(&self.pool, cursor.last_seen())
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(MetricRow::from).collect())
    }

    async fn insert_alert(&self, device_id: DbId, message: &str) -> Result<(), StoreError> {
        let alert_id = DeviceAlertRepo::insert(&self.pool, device_id, message)
            .await
            .map_err(store_error)?;
        tracing::debug!(device_id, alert_id, "Alert record inserted");
        Ok(())
    }
}

/// Split sqlx failures into "could not reach the database" and "the
/// statement failed".
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(Box::new(err)),
        other => StoreError::Query(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_maps_to_connection_error() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut),
            StoreError::Connection(_)
        ));
    }

    #[test]
    fn row_not_found_maps_to_query_error() {
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
    }
}
