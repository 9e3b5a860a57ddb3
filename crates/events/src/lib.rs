//! Outbound alert delivery for the device metric monitor.
//!
//! - [`EmailNotifier`] — SMTP [`Notifier`](devwatch_core::Notifier) built on
//!   the `lettre` async transport.
//! - [`RedisAlertCache`] — [`AlertCache`](devwatch_core::AlertCache) that keeps
//!   the latest alert text per device in Redis.

pub mod delivery;

pub use delivery::cache::{RedisAlertCache, RedisConfig};
pub use delivery::email::{EmailConfig, EmailError, EmailNotifier};
