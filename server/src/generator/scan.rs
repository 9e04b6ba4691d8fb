use rand::{rngs::StdRng, Rng, SeedableRng};
use scancore::math::StatsHelper;
use scancore::model::{BleObservation, ScanSubmission, WifiObservation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_GENERATED: usize = 64;
const ENCRYPTION: [&str; 4] = ["OPEN", "WPA", "WPA2", "WPA3"];
const BLE_TYPES: [&str; 5] = ["phone", "watch", "headphones", "tag", "unknown"];

/// Configuration for generating synthetic scan reports.
///
/// Device identities depend on `seed` only, so successive scans built from
/// the same config see the same access points and beacons with fresh RSSI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub device_id: String,
    pub wifi_count: usize,
    pub ble_count: usize,
    pub seed: u64,
    /// Reference RSSI at 1 m, in dBm.
    pub tx_power: f64,
    pub path_loss_exp: f64,
    pub description: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            device_id: "simulator".into(),
            wifi_count: 8,
            ble_count: 4,
            seed: 0,
            tx_power: -40.0,
            path_loss_exp: 3.0,
            description: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_wifi(&self) -> usize {
        self.wifi_count.min(MAX_GENERATED)
    }

    fn normalized_ble(&self) -> usize {
        self.ble_count.min(MAX_GENERATED)
    }
}

/// Log-distance path loss model: `d = 10 ^ ((tx - rssi) / (10 * n))`.
fn estimate_distance(rssi: i32, tx_power: f64, path_loss_exp: f64) -> f64 {
    let exponent = (tx_power - f64::from(rssi)) / (10.0 * path_loss_exp.max(0.1));
    StatsHelper::round_to(10f64.powf(exponent), 2)
}

fn format_mac(bytes: [u8; 6], uppercase: bool) -> String {
    let parts: Vec<String> = bytes
        .iter()
        .map(|byte| {
            if uppercase {
                format!("{byte:02X}")
            } else {
                format!("{byte:02x}")
            }
        })
        .collect();
    parts.join(":")
}

fn reading(base: i32, readings: &mut StdRng) -> i32 {
    (base + readings.gen_range(-4..=4)).clamp(-100, -20)
}

pub fn build_scan_from_config(config: &GeneratorConfig, scan_number: u64) -> ScanSubmission {
    let mut identities = StdRng::seed_from_u64(config.seed);
    let mut readings = StdRng::seed_from_u64(config.seed ^ scan_number.rotate_left(32));

    let wifi = (0..config.normalized_wifi())
        .map(|index| {
            let bssid = format_mac(identities.gen(), true);
            let base = identities.gen_range(-90..=-35);
            let channel = identities.gen_range(1..=13);
            let encryption = ENCRYPTION[identities.gen_range(0..ENCRYPTION.len())];
            let rssi = reading(base, &mut readings);
            WifiObservation {
                bssid: Some(bssid),
                ssid: Some(format!("Network-{:02}", index + 1)),
                rssi: Some(rssi),
                distance: Some(estimate_distance(rssi, config.tx_power, config.path_loss_exp)),
                channel: Some(channel),
                encryption: Some(encryption.into()),
            }
        })
        .collect();

    let ble = (0..config.normalized_ble())
        .map(|index| {
            let address = format_mac(identities.gen(), false);
            let base = identities.gen_range(-95..=-45);
            let named = identities.gen_bool(0.6);
            let kind = BLE_TYPES[identities.gen_range(0..BLE_TYPES.len())];
            let rssi = reading(base, &mut readings);
            BleObservation {
                address: Some(address),
                name: named.then(|| format!("Beacon-{:02}", index + 1)),
                kind: Some(kind.into()),
                rssi: Some(rssi),
                distance: Some(estimate_distance(rssi, config.tx_power, config.path_loss_exp)),
            }
        })
        .collect();

    let mut submission = ScanSubmission::new(config.device_id.clone())
        .with_wifi(wifi)
        .with_ble(ble);
    submission.scan_number = Some(scan_number.into());
    if let Some(description) = &config.description {
        submission
            .extra
            .insert("description".into(), Value::String(description.clone()));
    }
    submission
}
