pub mod scan;

pub use scan::{build_scan_from_config, GeneratorConfig};
