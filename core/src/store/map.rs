use crate::math::bearing::bearing_from_identity;
use crate::math::geo::{Origin, DEFAULT_DISTANCE_M};
use crate::model::device::merge_value;
use crate::model::{BleObservation, ScanReport, WifiObservation};
use serde::{Deserialize, Serialize};

/// An observation placed on the map around the sensor origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedObservation<O> {
    #[serde(flatten)]
    pub observation: O,
    pub bearing: u32,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub origin: Origin,
    pub wifi: Vec<MappedObservation<WifiObservation>>,
    pub ble: Vec<MappedObservation<BleObservation>>,
    pub timestamp: String,
}

fn place<O>(origin: &Origin, mut observation: O, identity: Option<&str>) -> MappedObservation<O>
where
    O: HasDistance,
{
    let distance = observation.distance_or_default();
    let bearing = bearing_from_identity(identity);
    let point = origin.project(distance, f64::from(bearing));
    MappedObservation {
        observation,
        bearing,
        lat: point.lat,
        lng: point.lng,
    }
}

/// Missing and zero distances both fall back to the default, the same rule
/// [`merge_value`] applies to zero-valued descriptive fields.
fn fill_distance(slot: &mut Option<f64>) -> f64 {
    let mut distance = Some(DEFAULT_DISTANCE_M);
    merge_value(&mut distance, *slot);
    *slot = distance;
    distance.unwrap_or(DEFAULT_DISTANCE_M)
}

trait HasDistance {
    /// Fills in the default distance when missing and returns it.
    fn distance_or_default(&mut self) -> f64;
}

impl HasDistance for WifiObservation {
    fn distance_or_default(&mut self) -> f64 {
        fill_distance(&mut self.distance)
    }
}

impl HasDistance for BleObservation {
    fn distance_or_default(&mut self) -> f64 {
        fill_distance(&mut self.distance)
    }
}

impl MapData {
    /// Projects every observation of `latest` around `origin`.
    pub fn from_scan(origin: &Origin, latest: &ScanReport) -> Self {
        let wifi = latest
            .wifi
            .iter()
            .map(|observation| {
                place(origin, observation.clone(), observation.bssid.as_deref())
            })
            .collect();
        let ble = latest
            .ble
            .iter()
            .map(|observation| {
                place(origin, observation.clone(), observation.address.as_deref())
            })
            .collect();

        Self {
            origin: origin.clone(),
            wifi,
            ble,
            timestamp: latest.received_at.clone(),
        }
    }
}
