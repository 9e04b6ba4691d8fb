use crate::model::lenient;
use crate::prelude::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One access point reported by the sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WifiObservation {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    /// Estimated distance in metres.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::unsigned", skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
}

/// One BLE advertiser reported by the sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BleObservation {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Body of a scan POST as sent by the sensor, before validation.
///
/// Fields the collector does not interpret are kept in `extra` and stored
/// alongside the report. `scan_number` is informational and kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSubmission {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_number: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi: Option<Vec<WifiObservation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ble: Option<Vec<BleObservation>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanSubmission {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            ..Default::default()
        }
    }

    pub fn with_wifi(mut self, wifi: Vec<WifiObservation>) -> Self {
        self.wifi = Some(wifi);
        self
    }

    pub fn with_ble(mut self, ble: Vec<BleObservation>) -> Self {
        self.ble = Some(ble);
        self
    }

    /// Validates the submission and stamps it with the server receive time.
    pub fn into_report(self, received_at: String) -> ScanResult<ScanReport> {
        let device_id = match self.device_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ScanError::Validation("deviceId is required".into())),
        };

        let mut extra = self.extra;
        extra.remove("receivedAt");

        Ok(ScanReport {
            device_id,
            scan_number: self.scan_number,
            wifi: self.wifi.unwrap_or_default(),
            ble: self.ble.unwrap_or_default(),
            received_at,
            extra,
        })
    }
}

/// A validated scan as held in the rolling buffer. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_number: Option<Value>,
    #[serde(default)]
    pub wifi: Vec<WifiObservation>,
    #[serde(default)]
    pub ble: Vec<BleObservation>,
    pub received_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_device_id_is_rejected() {
        let err = ScanSubmission::default()
            .into_report("t".into())
            .unwrap_err();
        assert!(matches!(err, ScanError::Validation(_)));
    }

    #[test]
    fn empty_device_id_is_rejected() {
        let err = ScanSubmission::new("").into_report("t".into()).unwrap_err();
        assert!(matches!(err, ScanError::Validation(_)));
    }

    #[test]
    fn missing_lists_become_empty() {
        let report = ScanSubmission::new("esp32-01")
            .into_report("2026-01-01T00:00:00.000Z".into())
            .unwrap();
        assert!(report.wifi.is_empty());
        assert!(report.ble.is_empty());
        assert_eq!(report.received_at, "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn wire_format_is_camel_case_and_keeps_unknown_fields() {
        let submission: ScanSubmission = serde_json::from_value(json!({
            "deviceId": "esp32-01",
            "scanNumber": 7,
            "firmware": "1.2.0",
            "receivedAt": "spoofed",
            "wifi": [{"bssid": "AA:BB", "ssid": "home", "rssi": -50, "distance": 5.0, "channel": 6}],
            "ble": [{"address": "c4:de", "type": "phone", "rssi": -70}]
        }))
        .unwrap();

        let report = submission.into_report("now".into()).unwrap();
        assert_eq!(report.scan_number, Some(json!(7)));
        assert_eq!(report.ble[0].kind.as_deref(), Some("phone"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["deviceId"], "esp32-01");
        assert_eq!(value["firmware"], "1.2.0");
        assert_eq!(value["receivedAt"], "now");
        assert_eq!(value["ble"][0]["type"], "phone");
        assert_eq!(value["wifi"][0]["channel"], 6);
    }

    #[test]
    fn loosely_typed_fields_still_parse() {
        let submission: ScanSubmission = serde_json::from_value(json!({
            "deviceId": 42,
            "scanNumber": -1,
            "wifi": [
                {"ssid": "hidden"},
                {"bssid": "AA:BB", "rssi": -50.0, "channel": "11", "distance": "3.5"},
                {"bssid": "CC:DD", "rssi": "weak", "encryption": ["WPA2"]}
            ],
            "ble": [{"address": "c4:de", "rssi": -70.6, "name": null, "type": 3}]
        }))
        .unwrap();

        let report = submission.into_report("now".into()).unwrap();
        assert_eq!(report.device_id, "42");
        assert_eq!(report.scan_number, Some(json!(-1)));
        assert_eq!(report.wifi.len(), 3);
        assert_eq!(report.wifi[0].bssid, None);
        assert_eq!(report.wifi[0].rssi, None);
        assert_eq!(report.wifi[1].rssi, Some(-50));
        assert_eq!(report.wifi[1].channel, Some(11));
        assert_eq!(report.wifi[1].distance, Some(3.5));
        assert_eq!(report.wifi[2].rssi, None);
        assert_eq!(report.wifi[2].encryption, None);
        assert_eq!(report.ble[0].rssi, Some(-71));
        assert_eq!(report.ble[0].kind.as_deref(), Some("3"));
    }

    #[test]
    fn non_numeric_scan_number_is_kept_verbatim() {
        let submission: ScanSubmission = serde_json::from_value(json!({
            "deviceId": "esp32-01",
            "scanNumber": "batch-7"
        }))
        .unwrap();
        let report = submission.into_report("now".into()).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["scanNumber"], "batch-7");
    }
}
