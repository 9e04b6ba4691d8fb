//! Core aggregation engine for the WiFi/BLE scan collector.
//!
//! Scan reports posted by a remote sensor land in a bounded rolling buffer,
//! feed per-device RSSI statistics, and can be projected around the sensor's
//! fixed origin for map rendering.

pub mod math;
pub mod model;
pub mod prelude;
pub mod store;
pub mod telemetry;

pub use prelude::{ScanError, ScanObserver, ScanResult, StoreConfig};
pub use store::ScanStore;
