use crate::math::stats::StatsHelper;
use crate::model::scan::{BleObservation, ScanReport, WifiObservation};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Radio technology a tracked device was discovered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Wifi,
    Ble,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Wifi => f.write_str("WiFi"),
            DeviceKind::Ble => f.write_str("BLE"),
        }
    }
}

/// Overwrites `slot` with `incoming` only when the new text is non-empty.
pub fn merge_text(slot: &mut Option<String>, incoming: Option<&str>) {
    if let Some(value) = incoming.filter(|value| !value.is_empty()) {
        *slot = Some(value.to_string());
    }
}

/// Overwrites `slot` with `incoming` only when the new value is non-default.
pub fn merge_value<T: Copy + Default + PartialEq>(slot: &mut Option<T>, incoming: Option<T>) {
    if let Some(value) = incoming.filter(|value| *value != T::default()) {
        *slot = Some(value);
    }
}

/// Identity and descriptive fields of one kind of tracked device.
pub trait DeviceProfile: Clone + Serialize {
    type Observation: Observed<Profile = Self>;

    const KIND: DeviceKind;

    fn key(&self) -> &str;

    /// Case normalization applied to lookup keys.
    fn normalize_key(raw: &str) -> String;

    /// Folds the descriptive fields of a newer sighting into this profile.
    fn merge(&mut self, newer: &Self);

    fn observations(report: &ScanReport) -> &[Self::Observation];
}

/// A single sighting of a device inside a scan report.
pub trait Observed {
    type Profile;

    /// `None` when the observation carries no identity key.
    fn profile(&self) -> Option<Self::Profile>;
    fn rssi(&self) -> Option<i32>;
    fn distance(&self) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiProfile {
    pub bssid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
}

impl DeviceProfile for WifiProfile {
    type Observation = WifiObservation;

    const KIND: DeviceKind = DeviceKind::Wifi;

    fn key(&self) -> &str {
        &self.bssid
    }

    fn normalize_key(raw: &str) -> String {
        raw.to_uppercase()
    }

    fn merge(&mut self, newer: &Self) {
        merge_text(&mut self.ssid, newer.ssid.as_deref());
        merge_value(&mut self.channel, newer.channel);
        merge_text(&mut self.encryption, newer.encryption.as_deref());
    }

    fn observations(report: &ScanReport) -> &[WifiObservation] {
        &report.wifi
    }
}

impl Observed for WifiObservation {
    type Profile = WifiProfile;

    fn profile(&self) -> Option<WifiProfile> {
        let bssid = self.bssid.as_deref().filter(|bssid| !bssid.is_empty())?;
        Some(WifiProfile {
            bssid: bssid.to_string(),
            ssid: self.ssid.clone(),
            channel: self.channel,
            encryption: self.encryption.clone(),
        })
    }

    fn rssi(&self) -> Option<i32> {
        self.rssi
    }

    fn distance(&self) -> Option<f64> {
        self.distance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BleProfile {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl DeviceProfile for BleProfile {
    type Observation = BleObservation;

    const KIND: DeviceKind = DeviceKind::Ble;

    fn key(&self) -> &str {
        &self.address
    }

    fn normalize_key(raw: &str) -> String {
        raw.to_lowercase()
    }

    fn merge(&mut self, newer: &Self) {
        merge_text(&mut self.name, newer.name.as_deref());
        merge_text(&mut self.kind, newer.kind.as_deref());
    }

    fn observations(report: &ScanReport) -> &[BleObservation] {
        &report.ble
    }
}

impl Observed for BleObservation {
    type Profile = BleProfile;

    fn profile(&self) -> Option<BleProfile> {
        let address = self.address.as_deref().filter(|address| !address.is_empty())?;
        Some(BleProfile {
            address: address.to_string(),
            name: self.name.clone(),
            kind: self.kind.clone(),
        })
    }

    fn rssi(&self) -> Option<i32> {
        self.rssi
    }

    fn distance(&self) -> Option<f64> {
        self.distance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiSample {
    pub rssi: i32,
    pub timestamp: String,
    pub distance: Option<f64>,
}

/// Running statistics for one WiFi BSSID or BLE address.
///
/// `max_rssi`/`min_rssi` cover every observation ever recorded, while
/// `avg_rssi` only covers the samples still held in `rssi_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord<P> {
    #[serde(flatten)]
    pub profile: P,
    pub first_seen: String,
    pub last_seen: String,
    pub detection_count: u64,
    pub rssi_history: VecDeque<RssiSample>,
    pub max_rssi: i32,
    pub min_rssi: i32,
    pub avg_rssi: f64,
}

impl<P: DeviceProfile> DeviceRecord<P> {
    pub fn first_sighting(profile: P, sample: RssiSample) -> Self {
        let rssi = sample.rssi;
        let timestamp = sample.timestamp.clone();
        Self {
            profile,
            first_seen: timestamp.clone(),
            last_seen: timestamp,
            detection_count: 1,
            rssi_history: VecDeque::from(vec![sample]),
            max_rssi: rssi,
            min_rssi: rssi,
            avg_rssi: f64::from(rssi),
        }
    }

    pub fn key(&self) -> &str {
        self.profile.key()
    }

    pub fn record_sighting(&mut self, profile: &P, sample: RssiSample, history_capacity: usize) {
        self.last_seen = sample.timestamp.clone();
        self.detection_count += 1;
        self.profile.merge(profile);

        self.max_rssi = self.max_rssi.max(sample.rssi);
        self.min_rssi = self.min_rssi.min(sample.rssi);

        self.rssi_history.push_back(sample);
        while self.rssi_history.len() > history_capacity.max(1) {
            self.rssi_history.pop_front();
        }

        let retained: Vec<f64> = self
            .rssi_history
            .iter()
            .map(|entry| f64::from(entry.rssi))
            .collect();
        self.avg_rssi = StatsHelper::round_to(StatsHelper::mean(&retained), 1);
    }
}

/// Coarse record of a reporting sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    pub device_id: String,
    pub first_seen: String,
    pub last_seen: String,
    pub scan_count: u64,
}

/// WiFi and BLE records in one list, tagged by radio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "deviceType", rename_all = "lowercase")]
pub enum TaggedDevice {
    Wifi(DeviceRecord<WifiProfile>),
    Ble(DeviceRecord<BleProfile>),
}
