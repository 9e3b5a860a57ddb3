//! Shared domain types and pure logic for the device metric monitor.
//!
//! Nothing in this crate performs I/O. The collaborator traits in
//! [`collaborators`] describe the store, cache and notifier the monitor
//! talks to; concrete implementations live in `devwatch-db` and
//! `devwatch-events`.

pub mod collaborators;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod thresholds;
pub mod types;

pub use collaborators::{AlertCache, MetricStore, Notifier};
pub use cursor::Cursor;
pub use error::{CacheError, CoreError, NotifyError, StoreError};
pub use metrics::{MetricRow, METRIC_SLOTS};
pub use thresholds::{AlertEvent, ExpectedThresholds, MetricDeviation};
