use crate::model::ScanReport;
use log::{error, info, warn};
use serde_json::Value;
use std::fmt::Display;

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// One line per accepted scan: sensor, scan number and radio counts.
    pub fn record_scan(&self, report: &ScanReport) {
        let scan_number = match &report.scan_number {
            None | Some(Value::Null) => "N/A".to_string(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };
        self.record(&format!(
            "Scan received - device: {} | scan #{} | WiFi: {} | BLE: {}",
            report.device_id,
            scan_number,
            report.wifi.len(),
            report.ble.len()
        ));
    }

    pub fn record_rejection(&self, context: &str, reason: &dyn Display) {
        warn!("{}: {}", context, reason);
    }

    pub fn record_failure(&self, context: &str, reason: &dyn Display) {
        error!("{}: {}", context, reason);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
