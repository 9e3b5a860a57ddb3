//! In-memory collaborators for exercising the poller, processor and
//! dispatcher without PostgreSQL, Redis or SMTP.
//!
//! All three fakes can share a [`CallLog`] so tests can assert the order in
//! which sinks were invoked.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::TimeZone;
use devwatch_core::types::DbId;
use devwatch_core::{
    AlertCache, CacheError, Cursor, MetricRow, MetricStore, NotifyError, Notifier, StoreError,
};

/// Ordered record of sink invocations across fakes.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

fn io_error(msg: &str) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::other(msg.to_string()))
}

/// Build a telemetry row with a fixed capture time.
pub fn row(id: DbId, device_id: DbId, metrics: [i32; 5]) -> MetricRow {
    MetricRow {
        id,
        device_id,
        metrics,
        server_time: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// FakeStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<Vec<MetricRow>>,
    alerts: Mutex<Vec<(DbId, String)>>,
    log: Option<CallLog>,
    /// Number of upcoming fetches that fail.
    failing_fetches: AtomicUsize,
    fail_inserts: AtomicBool,
    fetch_delay: Option<Duration>,
    fetch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn append(&self, new_rows: impl IntoIterator<Item = MetricRow>) {
        self.rows.lock().unwrap().extend(new_rows);
    }

    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn alerts(&self) -> Vec<(DbId, String)> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter when a fetch ends, including when the
/// caller drops the fetch future part way through.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let running = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(running, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MetricStore for FakeStore {
    async fn fetch_since(&self, cursor: Cursor) -> Result<Vec<MetricRow>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            Err(StoreError::Connection(io_error("connection refused")))
        } else {
            let rows = self.rows.lock().unwrap();
            let fresh = rows
                .iter()
                .filter(|r| cursor.last_seen().map_or(true, |seen| r.id > seen))
                .cloned()
                .collect();
            Ok(fresh)
        }
    }

    async fn insert_alert(&self, device_id: DbId, message: &str) -> Result<(), StoreError> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push("record");
        }
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Query(io_error("insert rejected")));
        }
        self.alerts
            .lock()
            .unwrap()
            .push((device_id, message.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeCache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    log: Option<CallLog>,
    fail: bool,
    hang: bool,
}

impl FakeCache {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Never answers; only a timeout gets the caller past it.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl AlertCache for FakeCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push("cache");
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(CacheError::Connection(io_error("connection reset")));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeNotifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeNotifier {
    log: Option<CallLog>,
    /// Attempts that fail before the first success. `u32::MAX` never succeeds.
    failures_before_success: u32,
    attempts: AtomicU32,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    pub fn failing_first(mut self, failures: u32) -> Self {
        self.failures_before_success = failures;
        self
    }

    pub fn always_failing(self) -> Self {
        self.failing_first(u32::MAX)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push("notify");
        }
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            return Err(NotifyError::Delivery(io_error("451 temporary failure")));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        Ok(())
    }
}
