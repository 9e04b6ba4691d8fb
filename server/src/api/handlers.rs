use crate::api::error::{scan_error_reply, success, JsonReply};
use crate::generator::GeneratorConfig;
use crate::service::ScanService;
use percent_encoding::percent_decode_str;
use scancore::model::ScanSubmission;
use scancore::{ScanError, ScanResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::borrow::Cow;

/// Paging parameters for `GET /api/scans`, parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct ScansQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl ScansQuery {
    /// Missing, non-numeric and zero values fall back to the defaults.
    fn parse(raw: Option<&str>) -> Option<usize> {
        raw.and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
    }

    pub fn offset(&self) -> Option<usize> {
        Self::parse(self.offset.as_deref())
    }

    pub fn limit(&self) -> Option<usize> {
        Self::parse(self.limit.as_deref())
    }
}

fn respond<T>(
    service: &ScanService,
    context: &str,
    result: ScanResult<T>,
    body: impl FnOnce(T) -> Value,
) -> JsonReply {
    match result {
        Ok(value) => success(&body(value)),
        Err(err) => {
            if let ScanError::Internal(_) = err {
                service.log_failure(context, &err);
            }
            scan_error_reply(&err)
        }
    }
}

pub fn submit_scan(submission: ScanSubmission, service: ScanService) -> JsonReply {
    match service.submit_scan(submission) {
        Ok(receipt) => success(&json!({
            "success": true,
            "message": "Scan received",
            "scanId": receipt.scan_id,
            "timestamp": receipt.timestamp,
        })),
        Err(err) => scan_error_reply(&err),
    }
}

pub fn latest_scan(service: ScanService) -> JsonReply {
    let result = service.latest_scan();
    respond(&service, "Error fetching latest scan", result, |latest| match latest {
        Some(scan) => json!({"success": true, "data": scan}),
        None => json!({"success": true, "data": null, "message": "No scans available"}),
    })
}

pub fn list_scans(query: ScansQuery, service: ScanService) -> JsonReply {
    let result = service.scans(query.offset(), query.limit());
    respond(&service, "Error fetching scans", result, |page| {
        json!({
            "success": true,
            "data": page.items,
            "total": page.total,
            "limit": page.limit,
            "offset": page.offset,
        })
    })
}

pub fn stats(service: ScanService) -> JsonReply {
    let result = service.stats();
    respond(&service, "Error computing statistics", result, |stats| {
        json!({"success": true, "data": stats})
    })
}

pub fn all_devices(service: ScanService) -> JsonReply {
    let result = service.all_devices();
    respond(&service, "Error listing devices", result, |devices| {
        json!({"success": true, "total": devices.len(), "data": devices})
    })
}

pub fn wifi_devices(service: ScanService) -> JsonReply {
    let result = service.wifi_devices();
    respond(&service, "Error listing WiFi devices", result, |devices| {
        json!({"success": true, "total": devices.len(), "data": devices})
    })
}

pub fn ble_devices(service: ScanService) -> JsonReply {
    let result = service.ble_devices();
    respond(&service, "Error listing BLE devices", result, |devices| {
        json!({"success": true, "total": devices.len(), "data": devices})
    })
}

/// Path segments arrive percent-encoded (`AA%3ABB`); keys are matched decoded.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

pub fn wifi_device(bssid: String, service: ScanService) -> JsonReply {
    let result = service.wifi_device(&decode_segment(&bssid));
    respond(&service, "Error fetching WiFi device", result, |device| {
        json!({"success": true, "data": device})
    })
}

pub fn ble_device(address: String, service: ScanService) -> JsonReply {
    let result = service.ble_device(&decode_segment(&address));
    respond(&service, "Error fetching BLE device", result, |device| {
        json!({"success": true, "data": device})
    })
}

pub fn sensors(service: ScanService) -> JsonReply {
    let result = service.sensors();
    respond(&service, "Error listing sensors", result, |sensors| {
        json!({"success": true, "total": sensors.len(), "data": sensors})
    })
}

pub fn map_data(service: ScanService) -> JsonReply {
    let result = service.map_data();
    respond(&service, "Error building map data", result, |map| match map {
        Some(map) => json!({"success": true, "data": map}),
        None => json!({"success": true, "data": null, "message": "No map data available"}),
    })
}

pub fn health(service: ScanService) -> JsonReply {
    let result = service.health();
    respond(&service, "Error reading health", result, |health| json!(health))
}

pub fn simulate(config: GeneratorConfig, service: ScanService) -> JsonReply {
    let result = service.simulate(&config);
    match result {
        Ok(scan) => success(&json!({
            "success": true,
            "message": "Synthetic scan ingested",
            "scanId": scan.receipt.scan_id,
            "timestamp": scan.receipt.timestamp,
            "wifi": scan.wifi,
            "ble": scan.ble,
        })),
        Err(err) => scan_error_reply(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(offset: Option<&str>, limit: Option<&str>) -> ScansQuery {
        ScansQuery {
            offset: offset.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn segments_are_percent_decoded() {
        assert_eq!(decode_segment("aa%3Abb%3Acc"), "aa:bb:cc");
        assert_eq!(decode_segment("AA:BB"), "AA:BB");
        assert_eq!(decode_segment("c4%3ade"), "c4:de");
    }

    #[test]
    fn paging_values_are_lenient() {
        assert_eq!(query(None, None).limit(), None);
        assert_eq!(query(Some("abc"), Some("0")).offset(), None);
        assert_eq!(query(Some("abc"), Some("0")).limit(), None);
        assert_eq!(query(Some("-3"), Some(" 7 ")).offset(), None);
        assert_eq!(query(Some("-3"), Some(" 7 ")).limit(), Some(7));
        assert_eq!(query(Some("20"), None).offset(), Some(20));
    }
}
