use crate::math::geo::Origin;
use crate::model::ScanReport;
use serde::{Deserialize, Serialize};

/// Maximum number of scan reports kept in the rolling buffer.
pub const MAX_SCANS: usize = 100;

/// Maximum number of RSSI samples retained per tracked device.
pub const RSSI_HISTORY_CAPACITY: usize = 50;

/// Startup-time configuration shared by the store and its trackers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub buffer_capacity: usize,
    pub history_capacity: usize,
    pub origin: Origin,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: MAX_SCANS,
            history_capacity: RSSI_HISTORY_CAPACITY,
            origin: Origin::default(),
        }
    }
}

/// Common error type for store operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{kind} device {key} not found")]
    NotFound { kind: String, key: String },
    #[error("internal failure: {0}")]
    Internal(String),
}

impl ScanError {
    pub fn not_found(kind: impl ToString, key: impl Into<String>) -> Self {
        ScanError::NotFound {
            kind: kind.to_string(),
            key: key.into(),
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Anything that folds ingested scan reports into running state.
pub trait ScanObserver {
    fn observe(&mut self, report: &ScanReport);
    fn reset(&mut self);
}
