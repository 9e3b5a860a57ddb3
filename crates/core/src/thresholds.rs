//! Threshold evaluation for device telemetry rows.
//!
//! Pure logic, no I/O. Every metric slot has one expected value; a row whose
//! value differs from the expected one in any slot raises an alert. There is
//! no tolerance band and no cooldown: the same device can alert on every row.

use serde::{Deserialize, Serialize};

use crate::metrics::{MetricRow, METRIC_SLOTS};
use crate::types::{DbId, Timestamp};

/// Expected values for the five metric slots.
///
/// Loaded once at startup and shared read-only afterwards. The JSON form uses
/// the keys `metric1` .. `metric5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "ThresholdsFile")]
pub struct ExpectedThresholds {
    expected: [i32; METRIC_SLOTS],
}

/// On-disk shape of the thresholds file. Other keys are ignored, so the
/// file can be shared with tools that keep their own settings in it.
#[derive(Deserialize)]
struct ThresholdsFile {
    metric1: i32,
    metric2: i32,
    metric3: i32,
    metric4: i32,
    metric5: i32,
}

impl From<ThresholdsFile> for ExpectedThresholds {
    fn from(file: ThresholdsFile) -> Self {
        Self::new([
            file.metric1,
            file.metric2,
            file.metric3,
            file.metric4,
            file.metric5,
        ])
    }
}

impl ExpectedThresholds {
    pub fn new(expected: [i32; METRIC_SLOTS]) -> Self {
        Self { expected }
    }

    /// Expected values in slot order.
    pub fn values(&self) -> &[i32; METRIC_SLOTS] {
        &self.expected
    }
}

/// A single slot whose observed value differs from the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDeviation {
    /// 1-based slot number (`metric_1` is slot 1).
    pub slot: usize,
    pub expected: i32,
    pub actual: i32,
}

/// An alert raised for one row. Transient: built here, consumed by the
/// dispatcher, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    /// Id of the row that raised the alert.
    pub row_id: DbId,
    pub device_id: DbId,
    pub server_time: Timestamp,
    pub deviations: Vec<MetricDeviation>,
    /// Human-readable text sent to every sink.
    pub text: String,
}

impl AlertEvent {
    /// Cache key for the alerting device.
    pub fn device_key(&self) -> String {
        self.device_id.to_string()
    }
}

/// Whether any metric in `row` differs from its expected value.
pub fn needs_alert(row: &MetricRow, thresholds: &ExpectedThresholds) -> bool {
    row.metrics
        .iter()
        .zip(thresholds.values())
        .any(|(actual, expected)| actual != expected)
}

/// Every slot in `row` that differs from its expected value, in slot order.
pub fn deviations(row: &MetricRow, thresholds: &ExpectedThresholds) -> Vec<MetricDeviation> {
    row.metrics
        .iter()
        .zip(thresholds.values())
        .enumerate()
        .filter(|(_, (actual, expected))| actual != expected)
        .map(|(index, (&actual, &expected))| MetricDeviation {
            slot: index + 1,
            expected,
            actual,
        })
        .collect()
}

/// Format the alert text for `row`.
///
/// Always contains the device id and the capture timestamp; deviating slots
/// are appended when known.
pub fn alert_text(row: &MetricRow, deviations: &[MetricDeviation]) -> String {
    let mut text = format!(
        "Device {} metric is out of bounds! Server time: {}",
        row.device_id,
        row.server_time.to_rfc3339()
    );

    if !deviations.is_empty() {
        let details: Vec<String> = deviations
            .iter()
            .map(|d| format!("metric_{}: expected {}, got {}", d.slot, d.expected, d.actual))
            .collect();
        text.push_str(" (");
        text.push_str(&details.join("; "));
        text.push(')');
    }

    text
}

/// Evaluate one row, returning the alert to dispatch if it deviates.
pub fn evaluate(row: &MetricRow, thresholds: &ExpectedThresholds) -> Option<AlertEvent> {
    if !needs_alert(row, thresholds) {
        return None;
    }

    let deviations = deviations(row, thresholds);
    let text = alert_text(row, &deviations);

    Some(AlertEvent {
        row_id: row.id,
        device_id: row.device_id,
        server_time: row.server_time,
        deviations,
        text,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
