use std::fmt::{Debug, Formatter};
use tetrapi_core::{utils::Redact, SigningCredential};

/// Credential for the OpenAPI: the key/secret pair from the platform's key
/// generation UI.
#[derive(Clone)]
pub struct Credential {
    /// Hex API key, sent in the `Id` header.
    pub api_key: String,
    /// Hex API secret, used as the HMAC signing key. Never transmitted.
    pub api_secret: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &Redact::from(&self.api_key))
            .field("api_secret", &Redact::from(&self.api_secret))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}
