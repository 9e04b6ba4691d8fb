use crate::generator::{build_scan_from_config, GeneratorConfig};
use scancore::model::{
    BleProfile, DeviceRecord, ScanReport, ScanSubmission, SensorRecord, TaggedDevice, WifiProfile,
};
use scancore::store::{IngestReceipt, MapData, ScanPage, StatisticsSnapshot};
use scancore::telemetry::{timestamp, LogManager, MetricsRecorder, MetricsSnapshot};
use scancore::{ScanError, ScanResult, ScanStore, StoreConfig};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the service was created.
    pub uptime: f64,
    pub buffered_scans: usize,
    pub buffer_capacity: usize,
    pub history_capacity: usize,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone)]
pub struct SimulatedScan {
    pub receipt: IngestReceipt,
    pub wifi: usize,
    pub ble: usize,
}

/// Shared handle to the store. Every operation takes the store mutex once, so
/// an ingestion updates the buffer and all trackers as a single unit.
#[derive(Clone)]
pub struct ScanService {
    store: Arc<Mutex<ScanStore>>,
    metrics: Arc<MetricsRecorder>,
    logger: Arc<LogManager>,
    simulated: Arc<AtomicU64>,
    started: Instant,
}

impl ScanService {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(ScanStore::new(config))),
            metrics: Arc::new(MetricsRecorder::new()),
            logger: Arc::new(LogManager::new()),
            simulated: Arc::new(AtomicU64::new(0)),
            started: Instant::now(),
        }
    }

    fn read<T>(&self, query: impl FnOnce(&ScanStore) -> ScanResult<T>) -> ScanResult<T> {
        let store = self
            .store
            .lock()
            .map_err(|_| ScanError::Internal("scan store lock poisoned".into()))?;
        query(&store)
    }

    fn write<T>(&self, update: impl FnOnce(&mut ScanStore) -> ScanResult<T>) -> ScanResult<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| ScanError::Internal("scan store lock poisoned".into()))?;
        update(&mut store)
    }

    pub fn submit_scan(&self, submission: ScanSubmission) -> ScanResult<IngestReceipt> {
        let result = self.write(|store| store.ingest(submission));
        match &result {
            Ok(_) => self.metrics.record_received(),
            Err(err @ ScanError::Validation(_)) => {
                self.metrics.record_rejected();
                self.logger.record_rejection("Scan rejected", err);
            }
            Err(err) => {
                self.metrics.record_internal_error();
                self.logger.record_failure("Error processing scan", err);
            }
        }
        result
    }

    /// Builds a synthetic scan and ingests it like any sensor report.
    pub fn simulate(&self, config: &GeneratorConfig) -> ScanResult<SimulatedScan> {
        let scan_number = self.simulated.fetch_add(1, Ordering::Relaxed) + 1;
        let submission = build_scan_from_config(config, scan_number);
        let wifi = submission.wifi.as_ref().map_or(0, Vec::len);
        let ble = submission.ble.as_ref().map_or(0, Vec::len);
        let receipt = self.submit_scan(submission)?;
        Ok(SimulatedScan { receipt, wifi, ble })
    }

    pub fn latest_scan(&self) -> ScanResult<Option<ScanReport>> {
        self.read(|store| Ok(store.latest_scan().cloned()))
    }

    pub fn scans(&self, offset: Option<usize>, limit: Option<usize>) -> ScanResult<ScanPage> {
        self.read(|store| Ok(store.scans(offset, limit)))
    }

    pub fn stats(&self) -> ScanResult<StatisticsSnapshot> {
        self.read(|store| Ok(store.stats()))
    }

    pub fn wifi_devices(&self) -> ScanResult<Vec<DeviceRecord<WifiProfile>>> {
        self.read(|store| Ok(store.wifi_devices()))
    }

    pub fn ble_devices(&self) -> ScanResult<Vec<DeviceRecord<BleProfile>>> {
        self.read(|store| Ok(store.ble_devices()))
    }

    pub fn all_devices(&self) -> ScanResult<Vec<TaggedDevice>> {
        self.read(|store| Ok(store.all_devices()))
    }

    pub fn sensors(&self) -> ScanResult<Vec<SensorRecord>> {
        self.read(|store| Ok(store.sensors()))
    }

    pub fn wifi_device(&self, bssid: &str) -> ScanResult<DeviceRecord<WifiProfile>> {
        self.read(|store| store.wifi_device(bssid))
    }

    pub fn ble_device(&self, address: &str) -> ScanResult<DeviceRecord<BleProfile>> {
        self.read(|store| store.ble_device(address))
    }

    pub fn map_data(&self) -> ScanResult<Option<MapData>> {
        self.read(|store| Ok(store.map_data()))
    }

    pub fn health(&self) -> ScanResult<HealthReport> {
        let (buffered_scans, buffer_capacity, history_capacity) = self.read(|store| {
            let (len, capacity) = store.buffer_usage();
            Ok((len, capacity, store.config().history_capacity))
        })?;
        Ok(HealthReport {
            status: "ok",
            timestamp: timestamp(),
            uptime: self.started.elapsed().as_secs_f64(),
            buffered_scans,
            buffer_capacity,
            history_capacity,
            metrics: self.metrics.snapshot(),
        })
    }

    pub fn log_failure(&self, context: &str, reason: &dyn std::fmt::Display) {
        self.metrics.record_internal_error();
        self.logger.record_failure(context, reason);
    }

    #[cfg(test)]
    pub fn reset(&self) {
        if let Ok(mut store) = self.store.lock() {
            store.reset();
        }
    }
}

impl Default for ScanService {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
