//! Query helpers, one zero-sized repository per table.

pub mod device_alert_repo;
pub mod device_metric_repo;

pub use device_alert_repo::DeviceAlertRepo;
pub use device_metric_repo::DeviceMetricRepo;
