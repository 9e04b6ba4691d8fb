//! Process-lifetime state of the collector: the rolling scan buffer plus the
//! WiFi, BLE and sensor trackers, owned by a single [`ScanStore`].

pub mod buffer;
pub mod map;
pub mod stats;
pub mod tracker;

pub use buffer::{ScanBuffer, ScanPage};
pub use map::{MapData, MappedObservation};
pub use stats::{StatisticsSnapshot, UniqueCounts};
pub use tracker::{DeviceTracker, SensorTracker};

use crate::math::geo::Origin;
use crate::model::{
    BleProfile, DeviceRecord, ScanReport, ScanSubmission, SensorRecord, TaggedDevice, WifiProfile,
};
use crate::prelude::{ScanObserver, ScanResult, StoreConfig};
use crate::telemetry::clock;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// What the caller gets back from a successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    /// Buffer length after the push; not a durable identifier.
    pub scan_id: usize,
    pub timestamp: String,
}

pub struct ScanStore {
    config: StoreConfig,
    buffer: ScanBuffer,
    wifi: DeviceTracker<WifiProfile>,
    ble: DeviceTracker<BleProfile>,
    sensors: SensorTracker,
    logger: LogManager,
}

impl ScanStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            buffer: ScanBuffer::with_capacity(config.buffer_capacity),
            wifi: DeviceTracker::new(config.history_capacity),
            ble: DeviceTracker::new(config.history_capacity),
            sensors: SensorTracker::new(),
            logger: LogManager::new(),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn origin(&self) -> &Origin {
        &self.config.origin
    }

    /// Validates, stamps and stores a report, then updates every tracker.
    pub fn ingest(&mut self, submission: ScanSubmission) -> ScanResult<IngestReceipt> {
        self.ingest_at(submission, clock::timestamp())
    }

    /// Same as [`ScanStore::ingest`] with an explicit receive time.
    pub fn ingest_at(
        &mut self,
        submission: ScanSubmission,
        received_at: String,
    ) -> ScanResult<IngestReceipt> {
        let report = submission.into_report(received_at)?;

        self.wifi.observe(&report);
        self.ble.observe(&report);
        self.sensors.observe(&report);
        self.logger.record_scan(&report);

        let timestamp = report.received_at.clone();
        let scan_id = self.buffer.push(report);
        Ok(IngestReceipt { scan_id, timestamp })
    }

    /// Buffered report count and the buffer's capacity.
    pub fn buffer_usage(&self) -> (usize, usize) {
        (self.buffer.len(), self.buffer.capacity())
    }

    pub fn latest_scan(&self) -> Option<&ScanReport> {
        self.buffer.latest()
    }

    pub fn scans(&self, offset: Option<usize>, limit: Option<usize>) -> ScanPage {
        self.buffer.page(offset, limit)
    }

    pub fn stats(&self) -> StatisticsSnapshot {
        StatisticsSnapshot::compute(
            &self.buffer,
            UniqueCounts {
                sensors: self.sensors.len(),
                wifi: self.wifi.len(),
                ble: self.ble.len(),
            },
        )
    }

    pub fn wifi_devices(&self) -> Vec<DeviceRecord<WifiProfile>> {
        self.wifi.list().into_iter().cloned().collect()
    }

    pub fn ble_devices(&self) -> Vec<DeviceRecord<BleProfile>> {
        self.ble.list().into_iter().cloned().collect()
    }

    /// WiFi records followed by BLE records, each group most recent first.
    pub fn all_devices(&self) -> Vec<TaggedDevice> {
        let wifi = self.wifi.list().into_iter().cloned().map(TaggedDevice::Wifi);
        let ble = self.ble.list().into_iter().cloned().map(TaggedDevice::Ble);
        wifi.chain(ble).collect()
    }

    pub fn sensors(&self) -> Vec<SensorRecord> {
        self.sensors.list().into_iter().cloned().collect()
    }

    pub fn wifi_device(&self, bssid: &str) -> ScanResult<DeviceRecord<WifiProfile>> {
        self.wifi.get(bssid).cloned()
    }

    pub fn ble_device(&self, address: &str) -> ScanResult<DeviceRecord<BleProfile>> {
        self.ble.get(address).cloned()
    }

    /// Map placement of the latest scan, `None` while the buffer is empty.
    pub fn map_data(&self) -> Option<MapData> {
        self.buffer
            .latest()
            .map(|latest| MapData::from_scan(&self.config.origin, latest))
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.wifi.reset();
        self.ble.reset();
        self.sensors.reset();
    }
}

impl Default for ScanStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
