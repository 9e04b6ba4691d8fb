pub mod clock;
pub mod log;
pub mod metrics;

pub use clock::timestamp;
pub use self::log::LogManager;
pub use metrics::{MetricsRecorder, MetricsSnapshot};
