use crate::math::stats::StatsHelper;
use crate::store::buffer::ScanBuffer;
use serde::{Deserialize, Serialize};

/// Summary counters derived on demand from the store.
///
/// Totals and averages only cover the reports still in the rolling buffer,
/// while the `unique*` counts come from the trackers and never shrink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub total_scans: usize,
    pub total_devices: usize,
    #[serde(rename = "totalWiFi")]
    pub total_wifi: usize,
    #[serde(rename = "totalBLE")]
    pub total_ble: usize,
    pub unique_devices: usize,
    #[serde(rename = "uniqueWiFi")]
    pub unique_wifi: usize,
    #[serde(rename = "uniqueBLE")]
    pub unique_ble: usize,
    #[serde(rename = "avgWiFiPerScan")]
    pub avg_wifi_per_scan: f64,
    #[serde(rename = "avgBLEPerScan")]
    pub avg_ble_per_scan: f64,
    pub last_update: Option<String>,
}

/// Lifetime tracker sizes fed into a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueCounts {
    pub sensors: usize,
    pub wifi: usize,
    pub ble: usize,
}

impl StatisticsSnapshot {
    pub fn compute(buffer: &ScanBuffer, unique: UniqueCounts) -> Self {
        let total_scans = buffer.len();
        let total_wifi: usize = buffer.iter().map(|scan| scan.wifi.len()).sum();
        let total_ble: usize = buffer.iter().map(|scan| scan.ble.len()).sum();

        Self {
            total_scans,
            total_devices: total_wifi + total_ble,
            total_wifi,
            total_ble,
            unique_devices: unique.sensors,
            unique_wifi: unique.wifi,
            unique_ble: unique.ble,
            avg_wifi_per_scan: StatsHelper::per_unit(total_wifi, total_scans),
            avg_ble_per_scan: StatsHelper::per_unit(total_ble, total_scans),
            last_update: buffer.latest().map(|scan| scan.received_at.clone()),
        }
    }
}
