use chrono::{SecondsFormat, Utc};

/// Current UTC wall-clock time as RFC 3339 with millisecond precision.
///
/// All strings share one fixed-width layout, so they compare in time order.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
