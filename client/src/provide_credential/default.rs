use crate::provide_credential::{
    ConfigCredentialProvider, CredentialsFileProvider, EnvCredentialProvider,
};
use crate::{Config, Credential};
use async_trait::async_trait;
use std::sync::Arc;
use tetrapi_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider tries the standard sources in order.
///
/// Resolution order:
///
/// 1. Key/secret set inline on the config
/// 2. The credentials file, when a path is configured
/// 3. `TETRATION_API_KEY` / `TETRATION_API_SECRET` environment variables
///
/// A configured credentials file that turns out to be malformed aborts the
/// lookup instead of silently falling through to the environment.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider for the given config.
    pub fn new(config: Arc<Config>) -> Self {
        let mut chain =
            ProvideCredentialChain::new().push(ConfigCredentialProvider::new(config.clone()));

        if let Some(path) = &config.credentials_file {
            chain = chain.push(CredentialsFileProvider::new(path.clone()));
        }

        Self {
            chain: chain.push(EnvCredentialProvider::new()),
        }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a high-priority credential source tried before the defaults.
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TETRATION_API_KEY, TETRATION_API_SECRET};
    use std::io::Write;
    use tetrapi_core::StaticEnv;
    use tetrapi_file_read_tokio::TokioFileRead;

    fn ctx_with_env(envs: Vec<(&str, &str)>) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs: envs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
    }

    #[tokio::test]
    async fn test_inline_beats_file_and_env() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(br#"{"api_key": "file_key", "api_secret": "file_secret"}"#)
            .unwrap();

        let config = Arc::new(
            Config::new()
                .with_api_key("inline_key")
                .with_api_secret("inline_secret")
                .with_credentials_file(f.path().to_str().unwrap()),
        );
        let ctx = ctx_with_env(vec![
            (TETRATION_API_KEY, "env_key"),
            (TETRATION_API_SECRET, "env_secret"),
        ]);

        let cred = DefaultCredentialProvider::new(config)
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.api_key, "inline_key");
    }

    #[tokio::test]
    async fn test_file_beats_env() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(br#"{"api_key": "file_key", "api_secret": "file_secret"}"#)
            .unwrap();

        let config = Arc::new(Config::new().with_credentials_file(f.path().to_str().unwrap()));
        let ctx = ctx_with_env(vec![
            (TETRATION_API_KEY, "env_key"),
            (TETRATION_API_SECRET, "env_secret"),
        ]);

        let cred = DefaultCredentialProvider::new(config)
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.api_key, "file_key");
    }

    #[tokio::test]
    async fn test_env_is_last_resort() {
        let config = Arc::new(Config::new());
        let ctx = ctx_with_env(vec![
            (TETRATION_API_KEY, "env_key"),
            (TETRATION_API_SECRET, "env_secret"),
        ]);

        let cred = DefaultCredentialProvider::new(config)
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.api_key, "env_key");
    }

    #[tokio::test]
    async fn test_no_source_yields_nothing() {
        let config = Arc::new(Config::new());
        let ctx = ctx_with_env(vec![]);

        let cred = DefaultCredentialProvider::new(config)
            .provide_credential(&ctx)
            .await
            .unwrap();
        assert!(cred.is_none());
    }

    #[tokio::test]
    async fn test_broken_file_aborts_lookup() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(br#"{"api_key": "file_key"}"#).unwrap();

        let config = Arc::new(Config::new().with_credentials_file(f.path().to_str().unwrap()));
        let ctx = ctx_with_env(vec![
            (TETRATION_API_KEY, "env_key"),
            (TETRATION_API_SECRET, "env_secret"),
        ]);

        let err = DefaultCredentialProvider::new(config)
            .provide_credential(&ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("api_secret missing"));
    }
}
