use crate::constants::{TETRATION_API_KEY, TETRATION_API_SECRET};
use crate::Credential;
use async_trait::async_trait;
use tetrapi_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads the key/secret pair from the environment.
///
/// This provider looks for:
/// - `TETRATION_API_KEY`
/// - `TETRATION_API_SECRET`
///
/// Both must be present; otherwise it yields nothing and the chain moves on.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        match (
            ctx.env_var(TETRATION_API_KEY),
            ctx.env_var(TETRATION_API_SECRET),
        ) {
            (Some(key), Some(secret)) => Ok(Some(Credential::new(key, secret))),
            _ => Ok(None),
        }
    }
}
