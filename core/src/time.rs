//! Time related utils.

use chrono::Utc;

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// The timestamp format the OpenAPI backend validates signatures against.
///
/// The offset is hardcoded as `+0000`; the backend does not accept `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+0000";

/// Create a new DateTime of the current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a DateTime into the fixed OpenAPI timestamp form.
///
/// For example: `2026-08-27T09:30:00+0000`.
pub fn format_timestamp(t: DateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}
