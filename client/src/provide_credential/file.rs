use crate::Credential;
use async_trait::async_trait;
use serde::Deserialize;
use tetrapi_core::{Context, Error, ProvideCredential, Result};

/// CredentialsFileProvider loads the key/secret pair from a JSON file.
///
/// Expected format:
///
/// ```json
/// {
///     "api_key": "<hex string>",
///     "api_secret": "<hex string>"
/// }
/// ```
///
/// A leading `~` in the path is expanded against the home directory. A file
/// that exists but is missing either key is a fatal configuration error
/// naming the absent key; it is not skipped.
#[derive(Debug)]
pub struct CredentialsFileProvider {
    path: String,
}

#[derive(Deserialize)]
struct CredentialsFile {
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl CredentialsFileProvider {
    /// Create a new CredentialsFileProvider for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProvideCredential for CredentialsFileProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let path = ctx.expand_home_dir(&self.path).ok_or_else(|| {
            Error::config_invalid(format!(
                "cannot expand home directory in credentials file path \"{}\"",
                self.path
            ))
        })?;

        let content = ctx.file_read(&path).await.map_err(|e| {
            Error::config_invalid(format!("cannot read credentials file \"{path}\""))
                .with_source(e)
        })?;

        let parsed: CredentialsFile = serde_json::from_slice(&content).map_err(|e| {
            Error::config_invalid(format!("credentials file \"{path}\" is not valid JSON"))
                .with_source(e)
        })?;

        let api_key = parsed.api_key.ok_or_else(|| {
            Error::config_invalid(format!("api_key missing in \"{path}\" file"))
        })?;
        let api_secret = parsed.api_secret.ok_or_else(|| {
            Error::config_invalid(format!("api_secret missing in \"{path}\" file"))
        })?;

        Ok(Some(Credential::new(api_key, api_secret)))
    }
}
