pub mod device;
pub mod lenient;
pub mod scan;

pub use device::{
    BleProfile, DeviceKind, DeviceProfile, DeviceRecord, Observed, RssiSample, SensorRecord,
    TaggedDevice, WifiProfile,
};
pub use scan::{BleObservation, ScanReport, ScanSubmission, WifiObservation};
