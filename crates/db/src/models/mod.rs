//! Row types for the monitor's tables.

pub mod device_alert;
pub mod device_metric;
