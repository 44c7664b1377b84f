use http::header::HeaderName;

// Environment variables: the fixed prefix joined with the upper-cased
// config field name.
pub const TETRATION_SERVER_ENDPOINT: &str = "TETRATION_SERVER_ENDPOINT";
pub const TETRATION_API_KEY: &str = "TETRATION_API_KEY";
pub const TETRATION_API_SECRET: &str = "TETRATION_API_SECRET";
pub const TETRATION_CREDENTIALS_FILE: &str = "TETRATION_CREDENTIALS_FILE";
pub const TETRATION_VERIFY: &str = "TETRATION_VERIFY";
pub const TETRATION_TIMEOUT: &str = "TETRATION_TIMEOUT";
pub const TETRATION_MAX_RETRIES: &str = "TETRATION_MAX_RETRIES";
pub const TETRATION_API_VERSION: &str = "TETRATION_API_VERSION";

// Auth headers the backend validates. Names are matched case-insensitively
// on the wire.
pub const HEADER_ID: HeaderName = HeaderName::from_static("id");
pub const HEADER_TIMESTAMP: HeaderName = HeaderName::from_static("timestamp");
pub const HEADER_CHECKSUM: HeaderName = HeaderName::from_static("x-tetration-cksum");

/// Fixed client identifier sent as `User-Agent`.
pub const CLIENT_USER_AGENT: &str = concat!("tetrapi Rust client/", env!("CARGO_PKG_VERSION"));
