//! Consumer side of the batch queue.
//!
//! [`Processor`] receives whatever the poller produced on each tick. Fetch
//! errors are logged and dropped (the poller retries on its next tick).
//! Batches are processed one row at a time, in id order: evaluate the row,
//! dispatch an alert if it deviates, move on. No row is revisited.

use devwatch_core::thresholds;
use devwatch_core::{AlertCache, ExpectedThresholds, MetricRow, MetricStore, Notifier};
use tokio::sync::mpsc;

use crate::dispatcher::Dispatcher;
use crate::poller::PollResult;

/// Counts for one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub alerts: usize,
}

/// Evaluates polled rows and dispatches the alerts they raise.
pub struct Processor<S, C, N> {
    thresholds: ExpectedThresholds,
    dispatcher: Dispatcher<S, C, N>,
}

impl<S, C, N> Processor<S, C, N>
where
    S: MetricStore,
    C: AlertCache,
    N: Notifier,
{
    pub fn new(thresholds: ExpectedThresholds, dispatcher: Dispatcher<S, C, N>) -> Self {
        Self {
            thresholds,
            dispatcher,
        }
    }

    /// Evaluate every row in `rows` and dispatch the alerts, sequentially.
    pub async fn process_batch(&self, rows: &[MetricRow]) -> BatchSummary {
        let mut summary = BatchSummary {
            rows: rows.len(),
            alerts: 0,
        };

        for row in rows {
            let Some(alert) = thresholds::evaluate(row, &self.thresholds) else {
                continue;
            };

            tracing::info!(
                device_id = alert.device_id,
                row_id = alert.row_id,
                deviations = alert.deviations.len(),
                "Metric out of bounds, raising alert"
            );
            self.dispatcher.dispatch(&alert).await;
            summary.alerts += 1;
        }

        summary
    }

    /// Handle one item from the queue.
    pub async fn handle(&self, item: PollResult) -> Option<BatchSummary> {
        match item {
            Ok(rows) => {
                let summary = self.process_batch(&rows).await;
                if summary.rows > 0 {
                    tracing::debug!(rows = summary.rows, alerts = summary.alerts, "Batch processed");
                }
                Some(summary)
            }
            Err(e) => {
                tracing::error!(error = %e, "Metric fetch failed");
                None
            }
        }
    }

    /// Drain the queue until the poller drops its sender.
    pub async fn run(self, mut rx: mpsc::Receiver<PollResult>) {
        while let Some(item) = rx.recv().await {
            self.handle(item).await;
        }
        tracing::info!("Batch queue closed, processor stopping");
    }
}
