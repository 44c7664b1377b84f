use crate::{Context, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign requests.
///
/// It loads a credential through the configured provider on first use,
/// caches it while it stays valid, and delegates the actual header
/// construction to the configured [`SignRequest`] implementation.
#[derive(Clone, Debug)]
pub struct Signer<C: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = C>>,
    builder: Arc<dyn SignRequest<Credential = C>>,
    credential: Arc<Mutex<Option<C>>>,
}

impl<C: SigningCredential> Signer<C> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = C>,
        builder: impl SignRequest<Credential = C>,
    ) -> Self {
        Self {
            ctx,

            provider: Arc::new(provider),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign the request in place.
    ///
    /// The body is needed because the checksum header is computed over it;
    /// pass an empty slice for bodyless requests.
    pub async fn sign(&self, parts: &mut http::request::Parts, body: &[u8]) -> Result<()> {
        let cred = self.credential.lock().expect("lock poisoned").clone();
        let cred = if cred.is_valid() {
            cred
        } else {
            let loaded = self.provider.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        self.builder
            .sign_request(&self.ctx, parts, body, cred.as_ref())
            .await
    }
}
