use crate::constants::*;
use log::warn;
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use tetrapi_core::{utils::Redact, Context};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of attempts for retryable verbs.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default OpenAPI version tag.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Config carries everything needed to talk to one OpenAPI endpoint.
///
/// Every field can be set explicitly or loaded from the matching
/// `TETRATION_*` environment variable via [`Config::from_env`]. An explicit
/// value always wins over the environment; unset optional fields fall back
/// to their declared defaults. The value is immutable once the client is
/// constructed.
#[derive(Clone, Default)]
pub struct Config {
    /// Server URL to query, e.g. `https://tetration.example.com`.
    ///
    /// Required; there is no default.
    pub server_endpoint: Option<String>,
    /// Hex API key from the platform's key generation UI.
    pub api_key: Option<String>,
    /// Hex API secret paired with `api_key`.
    pub api_secret: Option<String>,
    /// Path to a JSON credentials file holding `api_key` and `api_secret`.
    ///
    /// A leading `~` is expanded against the home directory.
    pub credentials_file: Option<String>,
    /// Whether to verify TLS certificates. Defaults to `true`.
    pub verify: Option<bool>,
    /// Request timeout in seconds. Defaults to 10.
    pub timeout: Option<u64>,
    /// Attempts for retryable verbs, minimum 1. Defaults to 3.
    pub max_retries: Option<u32>,
    /// OpenAPI version tag used in the URI prefix. Defaults to `v1`.
    pub api_version: Option<String>,
}

impl Config {
    /// Create a new empty Config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set server_endpoint.
    pub fn with_server_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.server_endpoint = Some(endpoint.into());
        self
    }

    /// Set api_key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set api_secret.
    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(api_secret.into());
        self
    }

    /// Set credentials_file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Set the TLS verification flag.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Set the request timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    /// Set max_retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set api_version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Fill unset fields from the environment.
    ///
    /// Returns a new value; the input is consumed, never mutated in place.
    /// Fields already set keep their value, preserving the precedence
    /// explicit > environment > default. An environment value that fails
    /// to parse is logged and ignored.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(TETRATION_SERVER_ENDPOINT) {
            self.server_endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TETRATION_API_KEY) {
            self.api_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TETRATION_API_SECRET) {
            self.api_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TETRATION_CREDENTIALS_FILE) {
            self.credentials_file.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TETRATION_VERIFY) {
            match v.parse() {
                Ok(parsed) => {
                    self.verify.get_or_insert(parsed);
                }
                Err(_) => warn!("ignoring {TETRATION_VERIFY}: {v:?} is not a boolean"),
            }
        }
        if let Some(v) = ctx.env_var(TETRATION_TIMEOUT) {
            match v.parse() {
                Ok(parsed) => {
                    self.timeout.get_or_insert(parsed);
                }
                Err(_) => warn!("ignoring {TETRATION_TIMEOUT}: {v:?} is not a number of seconds"),
            }
        }
        if let Some(v) = ctx.env_var(TETRATION_MAX_RETRIES) {
            match v.parse() {
                Ok(parsed) => {
                    self.max_retries.get_or_insert(parsed);
                }
                Err(_) => warn!("ignoring {TETRATION_MAX_RETRIES}: {v:?} is not a count"),
            }
        }
        if let Some(v) = ctx.env_var(TETRATION_API_VERSION) {
            self.api_version.get_or_insert(v);
        }

        self
    }

    /// TLS verification flag with the default applied.
    pub fn verify(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    /// Request timeout with the default applied.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Attempt count with the default applied, never below 1.
    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES).max(1)
    }

    /// API version tag with the default applied.
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_endpoint", &self.server_endpoint)
            .field("api_key", &self.api_key.as_ref().map(Redact::from))
            .field("api_secret", &self.api_secret.as_ref().map(Redact::from))
            .field("credentials_file", &self.credentials_file)
            .field("verify", &self.verify)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrapi_core::StaticEnv;

    fn env_ctx(envs: Vec<(&str, &str)>) -> Context {
        Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: envs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    #[test]
    fn test_explicit_value_beats_environment() {
        let ctx = env_ctx(vec![
            (TETRATION_SERVER_ENDPOINT, "https://from-env.example.com"),
            (TETRATION_API_VERSION, "v2"),
        ]);

        let config = Config::new()
            .with_server_endpoint("https://explicit.example.com")
            .from_env(&ctx);

        assert_eq!(
            config.server_endpoint.as_deref(),
            Some("https://explicit.example.com")
        );
        // Unset field is filled from the environment.
        assert_eq!(config.api_version(), "v2");
    }

    #[test]
    fn test_defaults_applied_last() {
        let config = Config::new().from_env(&env_ctx(vec![]));

        assert!(config.verify());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retries(), 3);
        assert_eq!(config.api_version(), "v1");
        assert!(config.server_endpoint.is_none());
    }

    #[test]
    fn test_numeric_and_bool_env_parsing() {
        let ctx = env_ctx(vec![
            (TETRATION_VERIFY, "false"),
            (TETRATION_TIMEOUT, "30"),
            (TETRATION_MAX_RETRIES, "0"),
        ]);

        let config = Config::new().from_env(&ctx);
        assert!(!config.verify());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        // max_retries is clamped to at least one attempt.
        assert_eq!(config.max_retries(), 1);
    }

    #[test]
    fn test_unparseable_env_values_fall_back_to_defaults() {
        let ctx = env_ctx(vec![
            (TETRATION_VERIFY, "yes"),
            (TETRATION_TIMEOUT, "10s"),
            (TETRATION_MAX_RETRIES, "many"),
        ]);

        let config = Config::new().from_env(&ctx);
        assert!(config.verify.is_none());
        assert!(config.timeout.is_none());
        assert!(config.max_retries.is_none());
        assert!(config.verify());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retries(), 3);
    }

    #[test]
    fn test_from_env_with_os_env() {
        temp_env::with_vars(
            vec![(TETRATION_API_KEY, Some("deadbeef"))],
            || {
                let ctx = Context::new().with_env(tetrapi_core::OsEnv);
                let config = Config::new().from_env(&ctx);
                assert_eq!(config.api_key.as_deref(), Some("deadbeef"));
            },
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new()
            .with_api_key("0123456789abcdef")
            .with_api_secret("fedcba9876543210");

        let out = format!("{config:?}");
        assert!(!out.contains("0123456789abcdef"));
        assert!(!out.contains("fedcba9876543210"));
    }
}
