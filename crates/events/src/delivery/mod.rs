//! External delivery channels for raised alerts.
//!
//! This module provides the e-mail notifier and the key-value alert cache
//! used by the dispatcher to push alerts outside the monitor.

pub mod cache;
pub mod email;
