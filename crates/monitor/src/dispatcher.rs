//! Alert fan-out to the cache, the alert log and the operator.
//!
//! Each raised alert is pushed to three sinks in a fixed order: the latest
//! alert text goes into the cache, a record goes into the store, and an
//! e-mail goes to the operator. The sinks are independent. A failure in one
//! is logged and never stops the others; only the notification is retried,
//! immediately and up to a fixed number of attempts. Every sink call is
//! bounded by a timeout, and a timeout counts as a failure of that call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use devwatch_core::{AlertCache, AlertEvent, MetricStore, Notifier};

use crate::error::{Sink, SinkError};

/// Default number of notification attempts per alert.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default upper bound on a single sink call.
const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatch settings, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Address every alert notification is sent to.
    pub recipient: String,
    /// Notification attempts per alert, including the first (at least 1).
    pub max_attempts: u32,
    /// Upper bound on each individual sink call.
    pub sink_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            sink_timeout: DEFAULT_SINK_TIMEOUT,
        }
    }
}

/// How the notification step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Sent on attempt number `attempts`.
    Delivered { attempts: u32 },
    /// Every attempt failed; the alert is not re-queued.
    Exhausted { attempts: u32 },
}

/// Per-sink result of dispatching one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub cache_written: bool,
    pub record_inserted: bool,
    pub notify: NotifyOutcome,
}

/// Pushes alerts to the cache, the store and the notifier.
pub struct Dispatcher<S, C, N> {
    store: Arc<S>,
    cache: C,
    notifier: N,
    config: DispatchConfig,
}

impl<S, C, N> Dispatcher<S, C, N>
where
    S: MetricStore,
    C: AlertCache,
    N: Notifier,
{
    pub fn new(store: Arc<S>, cache: C, notifier: N, config: DispatchConfig) -> Self {
        Self {
            store,
            cache,
            notifier,
            config,
        }
    }

    /// Run all three sinks for `alert`, in order: cache, record, notify.
    pub async fn dispatch(&self, alert: &AlertEvent) -> DispatchReport {
        let cache_written = self.write_cache(alert).await;
        let record_inserted = self.insert_record(alert).await;
        let notify = self.notify(alert).await;

        tracing::info!(
            device_id = alert.device_id,
            row_id = alert.row_id,
            cache_written,
            record_inserted,
            ?notify,
            "Alert dispatched"
        );

        DispatchReport {
            cache_written,
            record_inserted,
            notify,
        }
    }

    async fn write_cache(&self, alert: &AlertEvent) -> bool {
        let key = alert.device_key();
        let result = bounded(
            Sink::Cache,
            self.config.sink_timeout,
            self.cache.set(&key, &alert.text),
        )
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(device_id = alert.device_id, error = %e, "Alert cache write failed");
                false
            }
        }
    }

    async fn insert_record(&self, alert: &AlertEvent) -> bool {
        let result = bounded(
            Sink::Record,
            self.config.sink_timeout,
            self.store.insert_alert(alert.device_id, &alert.text),
        )
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(device_id = alert.device_id, error = %e, "Alert record insert failed");
                false
            }
        }
    }

    /// Immediate retry, no backoff. Exactly one failure log per failed
    /// attempt; the last one is logged at `error`.
    async fn notify(&self, alert: &AlertEvent) -> NotifyOutcome {
        let max_attempts = self.config.max_attempts.max(1);
        let recipient = self.config.recipient.as_str();

        for attempt in 1..=max_attempts {
            let result = bounded(
                Sink::Notify,
                self.config.sink_timeout,
                self.notifier.send(recipient, &alert.text),
            )
            .await;

            match result {
                Ok(()) => {
                    tracing::debug!(device_id = alert.device_id, attempt, "Alert notification sent");
                    return NotifyOutcome::Delivered { attempts: attempt };
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        device_id = alert.device_id,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Alert notification attempt failed, retrying"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        device_id = alert.device_id,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Alert notification failed after all attempts"
                    );
                }
            }
        }

        NotifyOutcome::Exhausted {
            attempts: max_attempts,
        }
    }
}

/// Await a sink call, turning an elapsed timeout into [`SinkError::Timeout`].
async fn bounded<F, E>(sink: Sink, limit: Duration, call: F) -> Result<(), SinkError>
where
    F: Future<Output = Result<(), E>>,
    SinkError: From<E>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(SinkError::from),
        Err(_) => Err(SinkError::Timeout { sink, after: limit }),
    }
}
