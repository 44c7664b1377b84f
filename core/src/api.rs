use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is implemented by credential types the signer caches.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is still usable for signing.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential loads a credential from the environment.
///
/// Sources differ per deployment: inline configuration, a credentials file
/// on disk, or process environment variables.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load a credential from the current environment.
    ///
    /// Returns `Ok(None)` when this source holds no credential; the caller
    /// may then consult the next source.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest attaches the auth headers for one outgoing request.
///
/// The request body is passed alongside the parts: the backend's checksum
/// header is computed over the body, and the signature covers that header,
/// so signing cannot be done from the parts alone.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// Implementations must set every header the signature covers before
    /// computing the signature itself.
    async fn sign_request(
        &self,
        ctx: &Context,
        parts: &mut http::request::Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}
