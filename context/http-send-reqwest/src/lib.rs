//! Reqwest-based HTTP sending for tetrapi.
//!
//! [`ReqwestHttpSend`] implements the `HttpSend` trait from `tetrapi-core`
//! on top of a persistent [`reqwest::Client`], so connections are reused
//! across calls.
//!
//! TLS verification and the request timeout are options on the client
//! built here, scoped to this instance. Nothing is changed process-wide.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use std::time::Duration;
use tetrapi_core::{Error, HttpSend, Result};

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a preconfigured reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the transport options the OpenAPI config carries.
    ///
    /// `verify_tls: false` accepts invalid certificates for this client
    /// only; `timeout` bounds each request including the response body.
    pub fn with_options(verify_tls: bool, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::unexpected("failed to build http client").with_source(e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("invalid http request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::unexpected("http request failed").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::unexpected("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
