//! Incremental polling of the telemetry table.
//!
//! [`Poller`] owns the fetch [`Cursor`]. On every tick it fetches the rows
//! appended since the last successful fetch and hands the result, batch or
//! error, to the processor through a bounded channel. Fetches are strictly
//! sequential: the loop awaits the fetch and the hand-off before it waits
//! for the next tick, and ticks missed in the meantime are skipped. The
//! cursor therefore has a single writer and only moves forward.

use std::sync::Arc;
use std::time::Duration;

use devwatch_core::{Cursor, MetricRow, MetricStore};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::PollError;

/// Default time between fetches.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default upper bound on a single fetch.
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What the poller hands downstream on every tick.
pub type PollResult = Result<Vec<MetricRow>, PollError>;

/// Polling settings, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub fetch_timeout: Duration,
    /// Initial cursor. [`Cursor::start`] replays the whole table.
    pub start: Cursor,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            start: Cursor::start(),
        }
    }
}

/// Fetches new telemetry rows on a fixed cadence.
pub struct Poller<S> {
    store: Arc<S>,
    cursor: Cursor,
    config: PollConfig,
    tx: mpsc::Sender<PollResult>,
}

impl<S: MetricStore> Poller<S> {
    pub fn new(store: Arc<S>, config: PollConfig, tx: mpsc::Sender<PollResult>) -> Self {
        Self {
            store,
            cursor: config.start,
            config,
            tx,
        }
    }

    /// The highest row id handed downstream so far.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Fetch once. Advances the cursor on success; leaves it untouched on
    /// failure so the same range is fetched again next time.
    pub async fn fetch(&mut self) -> PollResult {
        let fetched =
            tokio::time::timeout(self.config.fetch_timeout, self.store.fetch_since(self.cursor))
                .await;

        let rows = match fetched {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => return Err(PollError::Store(e)),
            Err(_) => return Err(PollError::Timeout(self.config.fetch_timeout)),
        };

        let previous = self.cursor;
        self.cursor.advance(&rows);

        if rows.is_empty() {
            tracing::trace!(cursor = %self.cursor, "No new metric rows");
        } else {
            tracing::debug!(
                rows = rows.len(),
                from = %previous,
                to = %self.cursor,
                "Fetched metric rows"
            );
        }

        Ok(rows)
    }

    /// One full poll cycle: fetch, then hand the result downstream.
    ///
    /// Returns `false` once the receiving side has gone away.
    pub async fn poll_once(&mut self) -> bool {
        let result = self.fetch().await;
        self.tx.send(result).await.is_ok()
    }

    /// Run the polling loop until `cancel` fires or the processor stops
    /// listening. The first fetch happens immediately. A batch still waiting
    /// for a queue slot when `cancel` fires is dropped.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            cursor = %self.cursor,
            "Metric poller started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Every await in the cycle also watches `cancel`, so a full queue
        // cannot hold up shutdown.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.fetch() => result,
            };

            let sent = tokio::select! {
                _ = cancel.cancelled() => break,
                sent = self.tx.send(result) => sent.is_ok(),
            };
            if !sent {
                tracing::warn!("Batch queue closed, metric poller stopping");
                return;
            }
        }

        tracing::info!(cursor = %self.cursor, "Metric poller stopping");
    }
}
