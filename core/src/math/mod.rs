pub mod bearing;
pub mod geo;
pub mod stats;

pub use bearing::bearing_from_identity;
pub use geo::{project, GeoPoint, Origin};
pub use stats::StatsHelper;
