use crate::{Context, ProvideCredential, Result};
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// A chain of credential providers that will be tried in order.
///
/// A provider answering `Ok(None)` falls through to the next one. A provider
/// answering `Err` aborts the whole chain: a source that exists but is
/// malformed (a credentials file missing a required key, say) must surface
/// as a fatal configuration error, not be shadowed by a lower-priority
/// source.
pub struct ProvideCredentialChain<C> {
    providers: Vec<Box<dyn ProvideCredential<Credential = C>>>,
}

impl<C: Send + Sync + Unpin + 'static> ProvideCredentialChain<C> {
    /// Create a new empty credential provider chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a credential provider to the end of the chain.
    pub fn push(mut self, provider: impl ProvideCredential<Credential = C> + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Add a credential provider to the front of the chain.
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = C> + 'static,
    ) -> Self {
        self.providers.insert(0, Box::new(provider));
        self
    }

    /// Create a credential provider chain from a vector of providers.
    pub fn from_vec(providers: Vec<Box<dyn ProvideCredential<Credential = C>>>) -> Self {
        Self { providers }
    }
}

impl<C: Send + Sync + Unpin + 'static> Default for ProvideCredentialChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for ProvideCredentialChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideCredentialChain")
            .field("providers_count", &self.providers.len())
            .finish()
    }
}

#[async_trait]
impl<C: Send + Sync + Unpin + 'static> ProvideCredential for ProvideCredentialChain<C> {
    type Credential = C;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        for provider in &self.providers {
            log::debug!("trying credential provider: {provider:?}");

            match provider.provide_credential(ctx).await? {
                Some(cred) => {
                    log::debug!("loaded credential from provider: {provider:?}");
                    return Ok(Some(cred));
                }
                None => {
                    log::debug!("no credential found in provider: {provider:?}");
                    continue;
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Clone, Debug)]
    struct TestCredential {
        key: String,
    }

    #[derive(Debug)]
    struct StaticProvider(&'static str);

    #[async_trait]
    impl ProvideCredential for StaticProvider {
        type Credential = TestCredential;

        async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
            Ok(Some(TestCredential {
                key: self.0.to_string(),
            }))
        }
    }

    #[derive(Debug)]
    struct EmptyProvider;

    #[async_trait]
    impl ProvideCredential for EmptyProvider {
        type Credential = TestCredential;

        async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
            Ok(None)
        }
    }

    #[derive(Debug)]
    struct BrokenProvider;

    #[async_trait]
    impl ProvideCredential for BrokenProvider {
        type Credential = TestCredential;

        async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
            Err(Error::config_invalid("credentials file is malformed"))
        }
    }

    #[tokio::test]
    async fn test_chain_returns_first_credential() {
        let chain = ProvideCredentialChain::new()
            .push(EmptyProvider)
            .push(StaticProvider("first"))
            .push(StaticProvider("second"));

        let cred = chain
            .provide_credential(&Context::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.key, "first");
    }

    #[tokio::test]
    async fn test_chain_empty_returns_none() {
        let chain: ProvideCredentialChain<TestCredential> = ProvideCredentialChain::new();
        let cred = chain.provide_credential(&Context::new()).await.unwrap();
        assert!(cred.is_none());
    }

    #[tokio::test]
    async fn test_chain_aborts_on_broken_source() {
        let chain = ProvideCredentialChain::new()
            .push(EmptyProvider)
            .push(BrokenProvider)
            .push(StaticProvider("unreachable"));

        let err = chain
            .provide_credential(&Context::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid);
    }

    #[tokio::test]
    async fn test_push_front_takes_priority() {
        let chain = ProvideCredentialChain::new()
            .push(StaticProvider("base"))
            .push_front(StaticProvider("override"));

        let cred = chain
            .provide_credential(&Context::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.key, "override");
    }
}
