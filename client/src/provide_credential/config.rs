use crate::{Config, Credential};
use async_trait::async_trait;
use std::sync::Arc;
use tetrapi_core::{Context, ProvideCredential, Result};

/// ConfigCredentialProvider returns the key/secret pair set inline on the
/// config, if both are present.
///
/// It deliberately does not consult the environment: inline values are the
/// highest-priority source, and environment fallback is a separate, later
/// link in the default chain.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new provider reading from the given config.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        if let (Some(key), Some(secret)) = (&self.config.api_key, &self.config.api_secret) {
            return Ok(Some(Credential::new(key.clone(), secret.clone())));
        }

        Ok(None)
    }
}
