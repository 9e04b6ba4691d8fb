use crate::model::{DeviceProfile, DeviceRecord, Observed, RssiSample, ScanReport, SensorRecord};
use crate::prelude::{ScanError, ScanObserver, ScanResult};
use std::collections::HashMap;

/// Per-device running statistics for one radio type.
///
/// Records are kept in first-seen order so that listings sorted by
/// `last_seen` break ties deterministically.
#[derive(Debug, Clone)]
pub struct DeviceTracker<P: DeviceProfile> {
    records: Vec<DeviceRecord<P>>,
    index: HashMap<String, usize>,
    history_capacity: usize,
}

impl<P: DeviceProfile> DeviceTracker<P> {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            history_capacity: history_capacity.max(1),
        }
    }

    /// Folds one observation into the tracker. Observations without an
    /// identity key, or without a usable RSSI reading, are skipped.
    pub fn record(&mut self, observation: &P::Observation, timestamp: &str) {
        let Some(profile) = observation.profile() else {
            return;
        };
        let Some(rssi) = observation.rssi() else {
            return;
        };
        let sample = RssiSample {
            rssi,
            timestamp: timestamp.to_string(),
            distance: observation.distance(),
        };

        match self.index.get(profile.key()) {
            Some(&slot) => {
                self.records[slot].record_sighting(&profile, sample, self.history_capacity);
            }
            None => {
                self.index
                    .insert(profile.key().to_string(), self.records.len());
                self.records
                    .push(DeviceRecord::first_sighting(profile, sample));
            }
        }
    }

    /// Looks a device up after applying the profile's key normalization.
    pub fn get(&self, raw_key: &str) -> ScanResult<&DeviceRecord<P>> {
        let key = P::normalize_key(raw_key);
        self.index
            .get(&key)
            .map(|&slot| &self.records[slot])
            .ok_or_else(|| ScanError::not_found(P::KIND, key))
    }

    /// All records, most recently seen first.
    pub fn list(&self) -> Vec<&DeviceRecord<P>> {
        let mut records: Vec<&DeviceRecord<P>> = self.records.iter().collect();
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<P: DeviceProfile> ScanObserver for DeviceTracker<P> {
    fn observe(&mut self, report: &ScanReport) {
        for observation in P::observations(report) {
            self.record(observation, &report.received_at);
        }
    }

    fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

/// Scan counts per reporting sensor.
#[derive(Debug, Clone, Default)]
pub struct SensorTracker {
    records: Vec<SensorRecord>,
    index: HashMap<String, usize>,
}

impl SensorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<&SensorRecord> {
        let mut records: Vec<&SensorRecord> = self.records.iter().collect();
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ScanObserver for SensorTracker {
    fn observe(&mut self, report: &ScanReport) {
        match self.index.get(&report.device_id) {
            Some(&slot) => {
                let sensor = &mut self.records[slot];
                sensor.last_seen = report.received_at.clone();
                sensor.scan_count += 1;
            }
            None => {
                self.index
                    .insert(report.device_id.clone(), self.records.len());
                self.records.push(SensorRecord {
                    device_id: report.device_id.clone(),
                    first_seen: report.received_at.clone(),
                    last_seen: report.received_at.clone(),
                    scan_count: 1,
                });
            }
        }
    }

    fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BleObservation, BleProfile, ScanSubmission, WifiObservation, WifiProfile,
    };

    fn wifi(bssid: &str, rssi: i32) -> WifiObservation {
        WifiObservation {
            bssid: Some(bssid.into()),
            rssi: Some(rssi),
            ..Default::default()
        }
    }

    fn scan(device_id: &str, at: &str, wifi: Vec<WifiObservation>) -> ScanReport {
        ScanSubmission::new(device_id)
            .with_wifi(wifi)
            .into_report(at.into())
            .unwrap()
    }

    #[test]
    fn repeated_sightings_accumulate() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        tracker.observe(&scan("s", "t1", vec![wifi("AA:BB", -50)]));
        tracker.observe(&scan("s", "t2", vec![wifi("AA:BB", -60)]));

        let record = tracker.get("aa:bb").unwrap();
        assert_eq!(record.detection_count, 2);
        assert_eq!(record.max_rssi, -50);
        assert_eq!(record.min_rssi, -60);
        assert_eq!(record.avg_rssi, -55.0);
        assert_eq!(record.rssi_history.len(), 2);
        assert_eq!(record.first_seen, "t1");
        assert_eq!(record.last_seen, "t2");
    }

    #[test]
    fn duplicate_report_counts_twice() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        let report = scan("s", "t1", vec![wifi("AA", -40)]);
        tracker.observe(&report);
        tracker.observe(&report);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("AA").unwrap().detection_count, 2);
    }

    #[test]
    fn keyless_observations_are_skipped() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        let keyless = WifiObservation {
            rssi: Some(-40),
            ..Default::default()
        };
        tracker.observe(&scan("s", "t1", vec![keyless, wifi("CC", -70)]));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn sightings_without_rssi_are_not_tracked() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        let silent = WifiObservation {
            bssid: Some("AA".into()),
            rssi: None,
            ..Default::default()
        };
        tracker.observe(&scan("s", "t1", vec![silent.clone()]));
        assert!(tracker.is_empty());

        tracker.observe(&scan("s", "t2", vec![wifi("AA", -50)]));
        tracker.observe(&scan("s", "t3", vec![silent]));
        let record = tracker.get("AA").unwrap();
        assert_eq!(record.detection_count, 1);
        assert_eq!(record.last_seen, "t2");
    }

    #[test]
    fn history_is_capped_and_average_follows_window() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        for n in 0..60 {
            let rssi = if n < 10 { -20 } else { -70 };
            tracker.observe(&scan("s", &format!("t{n:03}"), vec![wifi("AA", rssi)]));
        }
        let record = tracker.get("AA").unwrap();
        assert_eq!(record.rssi_history.len(), 50);
        assert_eq!(record.avg_rssi, -70.0);
        assert_eq!(record.max_rssi, -20);
        assert_eq!(record.min_rssi, -70);
        assert_eq!(record.detection_count, 60);
    }

    #[test]
    fn lookups_normalize_case_per_radio() {
        let mut wifi_tracker = DeviceTracker::<WifiProfile>::new(50);
        wifi_tracker.observe(&scan("s", "t1", vec![wifi("AA:BB:CC", -50)]));
        assert!(wifi_tracker.get("aa:bb:cc").is_ok());

        let mut ble_tracker = DeviceTracker::<BleProfile>::new(50);
        let report = ScanSubmission::new("s")
            .with_ble(vec![BleObservation {
                address: Some("c4:de:e2".into()),
                rssi: Some(-60),
                ..Default::default()
            }])
            .into_report("t1".into())
            .unwrap();
        ble_tracker.observe(&report);
        assert!(ble_tracker.get("C4:DE:E2").is_ok());

        let err = ble_tracker.get("00:11").unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn stored_key_keeps_submitted_case() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        tracker.observe(&scan("s", "t1", vec![wifi("aa:bb", -50)]));
        assert!(tracker.get("aa:bb").is_err());
        assert_eq!(tracker.list()[0].key(), "aa:bb");
    }

    #[test]
    fn list_is_most_recent_first_with_stable_ties() {
        let mut tracker = DeviceTracker::<WifiProfile>::new(50);
        tracker.observe(&scan("s", "t1", vec![wifi("A", -50), wifi("B", -50)]));
        tracker.observe(&scan("s", "t2", vec![wifi("C", -50)]));
        tracker.observe(&scan("s", "t3", vec![wifi("B", -50)]));

        let keys: Vec<&str> = tracker.list().iter().map(|record| record.key()).collect();
        assert_eq!(keys, vec!["B", "C", "A"]);

        tracker.observe(&scan("s", "t4", vec![wifi("A", -50), wifi("C", -50)]));
        let keys: Vec<&str> = tracker.list().iter().map(|record| record.key()).collect();
        assert_eq!(keys, vec!["A", "C", "B"]);
    }

    #[test]
    fn sensor_tracker_counts_scans() {
        let mut sensors = SensorTracker::new();
        sensors.observe(&scan("esp32-a", "t1", vec![]));
        sensors.observe(&scan("esp32-b", "t2", vec![]));
        sensors.observe(&scan("esp32-a", "t3", vec![]));

        let a = sensors.list()[0];
        assert_eq!(a.device_id, "esp32-a");
        assert_eq!(a.scan_count, 2);
        assert_eq!(a.first_seen, "t1");
        assert_eq!(a.last_seen, "t3");
        assert_eq!(sensors.len(), 2);

        sensors.reset();
        assert!(sensors.is_empty());
    }
}
