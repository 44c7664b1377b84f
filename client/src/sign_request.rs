//! OpenAPI request signing.

use std::fmt::Write;

use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderValue, Method};
use log::debug;
use tetrapi_core::hash::{base64_hmac_sha256, hex_sha256};
use tetrapi_core::time::{format_timestamp, now, DateTime};
use tetrapi_core::{Context, Error, Result, SignRequest, SigningRequest};

use crate::constants::{CLIENT_USER_AGENT, HEADER_CHECKSUM, HEADER_ID, HEADER_TIMESTAMP};
use crate::Credential;

/// RequestSigner implements the platform's HMAC header scheme.
///
/// The signature is an AWS/Azure-like construction: a SHA-256 checksum of
/// the body (mutating verbs only) and a UTC timestamp are set as headers,
/// then an HMAC-SHA256 over method, path, checksum, content type, and
/// timestamp is base64-encoded into `Authorization`.
///
/// Signing is deterministic for fixed inputs and timestamp; the only
/// run-to-run variation is the clock.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new RequestSigner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred =
            credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        let now = self.time.unwrap_or_else(now);

        let mut req = SigningRequest::build(parts)?;

        // The checksum must be set before the signature is computed: the
        // signature covers the exact header value transmitted.
        let mutating = req.method == Method::POST
            || req.method == Method::PUT
            || req.method == Method::DELETE;
        if !body.is_empty() && mutating {
            req.headers
                .insert(HEADER_CHECKSUM, hex_sha256(body).parse()?);
        }
        req.headers
            .insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        let timestamp = format_timestamp(now);
        req.headers.insert(HEADER_TIMESTAMP, timestamp.parse()?);
        req.headers.insert(HEADER_ID, cred.api_key.parse()?);

        let string_to_sign = string_to_sign(&req, &timestamp)?;
        let signature = base64_hmac_sha256(cred.api_secret.as_bytes(), string_to_sign.as_bytes());

        req.headers.insert(AUTHORIZATION, {
            let mut value: HeaderValue = signature.parse()?;
            value.set_sensitive(true);

            value
        });

        req.apply(parts)
    }
}

/// Construct the string to sign.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// path-with-query + "\n" +
/// X-Tetration-Cksum-or-empty + "\n" +
/// Content-Type-or-empty + "\n" +
/// Timestamp + "\n"
/// ```
fn string_to_sign(req: &SigningRequest, timestamp: &str) -> Result<String> {
    let mut s = String::new();
    writeln!(&mut s, "{}", req.method.as_str())?;
    writeln!(&mut s, "{}", req.path_and_query())?;
    writeln!(&mut s, "{}", req.header_get_or_default(&HEADER_CHECKSUM)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&CONTENT_TYPE)?)?;
    writeln!(&mut s, "{timestamp}")?;

    debug!("string to sign: {s:?}");
    Ok(s)
}
