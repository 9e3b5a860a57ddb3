//! Repository and store tests against a real PostgreSQL database.
//!
//! These need `DATABASE_URL` pointing at a server where `sqlx::test` can
//! create scratch databases, so they are ignored by default. Run with
//! `cargo test -p devwatch-db -- --ignored`.

use devwatch_core::{Cursor, MetricStore};
use devwatch_db::models::device_metric::CreateDeviceMetric;
use devwatch_db::repositories::{DeviceAlertRepo, DeviceMetricRepo};
use devwatch_db::PgMetricStore;
use sqlx::PgPool;

async fn seed(pool: &PgPool, device_id: i64, metrics: [i32; 5]) -> i64 {
    DeviceMetricRepo::insert(
        pool,
        &CreateDeviceMetric {
            device_id,
            metrics,
            server_time: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn health_check_passes(pool: PgPool) {
    devwatch_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn sentinel_cursor_fetches_whole_table_in_order(pool: PgPool) {
    for device in 1..=5 {
        seed(&pool, device, [10; 5]).await;
    }

    let store = PgMetricStore::new(pool);
    let rows = store.fetch_since(Cursor::start()).await.unwrap();

    assert_eq!(rows.len(), 5);
    assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn cursor_filters_strictly_greater_ids(pool: PgPool) {
    let first = seed(&pool, 1, [10; 5]).await;
    let second = seed(&pool, 2, [10; 5]).await;

    let store = PgMetricStore::new(pool);
    let mut cursor = Cursor::start();
    let rows = store.fetch_since(cursor).await.unwrap();
    cursor.advance(&rows);
    assert_eq!(cursor.last_seen(), Some(second));

    let rows = store.fetch_since(cursor).await.unwrap();
    assert!(rows.is_empty(), "nothing above {second}, got {rows:?}");

    let third = seed(store.pool(), 3, [9; 5]).await;
    let rows = store.fetch_since(cursor).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, third);
    assert!(rows[0].id > first);
    assert_eq!(rows[0].metrics, [9; 5]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn insert_alert_is_recorded_for_device(pool: PgPool) {
    let store = PgMetricStore::new(pool.clone());
    store
        .insert_alert(42, "Device 42 metric is out of bounds!")
        .await
        .unwrap();

    let alerts = DeviceAlertRepo::list_for_device(&pool, 42).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, "Device 42 metric is out of bounds!");
}
