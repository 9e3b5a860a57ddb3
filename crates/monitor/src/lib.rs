//! `devwatch-monitor` library crate.
//!
//! The polling-and-dispatch loop: the [`Poller`] fetches new telemetry rows
//! on a fixed cadence and hands each batch through a single-slot queue to
//! the [`Processor`], which evaluates every row and passes alerts to the
//! [`Dispatcher`]. The binary entrypoint in `main.rs` wires these to
//! PostgreSQL, Redis and SMTP.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod poller;
pub mod processor;

pub use config::MonitorConfig;
pub use dispatcher::{DispatchConfig, DispatchReport, Dispatcher, NotifyOutcome};
pub use error::{ConfigError, PollError, Sink, SinkError};
pub use poller::{PollConfig, PollResult, Poller};
pub use processor::{BatchSummary, Processor};
