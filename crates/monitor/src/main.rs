//! `devwatch-monitor` -- device metric threshold monitor.
//!
//! Polls the `device_metrics` table, raises an alert for every row whose
//! metrics differ from the configured expected values, and fans each alert
//! out to Redis, the `device_alerts` table and the operator's inbox. See
//! [`MonitorConfig::from_env`] for the environment variables.
//!
//! Any configuration or connection failure during startup is fatal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devwatch_db::PgMetricStore;
use devwatch_events::{EmailNotifier, RedisAlertCache};
use devwatch_monitor::{Dispatcher, MonitorConfig, Poller, Processor};

/// Batches waiting between poller and processor. One slot: the poller
/// cannot run ahead of the processor by more than a single batch.
const BATCH_QUEUE_CAPACITY: usize = 1;

/// How long shutdown waits for each background task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match MonitorConfig::from_env() {
        Ok(config) => {
            init_tracing(config.json_logs);
            config
        }
        Err(e) => {
            init_tracing(false);
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(error = ?e, "Monitor failed");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "devwatch_monitor=info,devwatch_events=info,devwatch_db=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: MonitorConfig) -> anyhow::Result<()> {
    tracing::info!(
        poll_interval_secs = config.poll.interval.as_secs(),
        recipient = %config.dispatch.recipient,
        max_attempts = config.dispatch.max_attempts,
        thresholds = ?config.thresholds.values(),
        start_cursor = %config.poll.start,
        "Loaded monitor configuration"
    );

    // --- Database ---
    let pool = devwatch_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    devwatch_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database connection pool created");

    if config.run_migrations {
        devwatch_db::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    // --- Redis ---
    let cache = RedisAlertCache::connect(&config.redis)
        .await
        .context("Failed to connect to Redis")?;
    tracing::info!("Redis connection established");

    // --- SMTP ---
    let notifier = EmailNotifier::new(&config.email).context("Invalid SMTP configuration")?;
    tracing::info!(smtp_host = %config.email.smtp_host, "Email notifier ready");

    // --- Pipeline ---
    let store = Arc::new(PgMetricStore::new(pool));
    let (tx, rx) = mpsc::channel(BATCH_QUEUE_CAPACITY);

    let poller = Poller::new(Arc::clone(&store), config.poll.clone(), tx);
    let dispatcher = Dispatcher::new(store, cache, notifier, config.dispatch.clone());
    let processor = Processor::new(config.thresholds, dispatcher);

    let cancel = CancellationToken::new();
    let poller_handle = tokio::spawn(poller.run(cancel.clone()));
    let processor_handle = tokio::spawn(processor.run(rx));

    tracing::info!("Monitor running");
    shutdown_signal().await;

    // Stopping the poller drops the queue sender, which lets the processor
    // finish the batch in hand and exit.
    cancel.cancel();
    if tokio::time::timeout(SHUTDOWN_GRACE, poller_handle).await.is_err() {
        tracing::warn!("Poller did not stop in time");
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, processor_handle).await.is_err() {
        tracing::warn!("Processor did not stop in time");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
