use crate::Credential;
use async_trait::async_trait;
use tetrapi_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider returns a fixed key/secret pair.
///
/// Meant for quick prototyping and tests; production deployments should
/// prefer the credentials file so secrets stay out of source code.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(api_key, api_secret),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
