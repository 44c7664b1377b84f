//! Uniform JSON CRUD on top of the signed transport.

use std::collections::HashSet;

use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::Value;
use tetrapi_core::{Context, Error, Result};

use crate::{Config, RestClient};

/// The outcome of a DELETE call.
///
/// Some endpoints answer a rejected delete with a non-success status that
/// still carries a descriptive JSON body (an object in use, a dependent
/// resource, etc.). Modeling that as a variant keeps "the server refused
/// and said why" distinct from both success and a hard error.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The server accepted the delete. Carries the decoded body, if any.
    Deleted(Option<Value>),
    /// The server refused with a tolerated status and a usable body.
    Rejected {
        /// The non-success status the server answered with.
        status: StatusCode,
        /// The decoded response body describing the refusal.
        body: Value,
    },
}

/// ApiClient speaks JSON to the OpenAPI resource endpoints.
///
/// All verbs share the same shape: serialize the payload, send it through
/// [`RestClient`], and decode the JSON answer. Status interpretation lives
/// here and nowhere else:
///
/// - GET 400 means "no such object" and decodes to `Ok(None)`;
/// - any other non-success status becomes an [`ErrorKind::Api`] error
///   carrying the status, the response text, and the operation name;
/// - a transport soft-fail (no usable credential) is a
///   [`ErrorKind::CredentialInvalid`] error here. Absence of a response is
///   never conflated with absence of the object.
///
/// [`ErrorKind::Api`]: tetrapi_core::ErrorKind::Api
/// [`ErrorKind::CredentialInvalid`]: tetrapi_core::ErrorKind::CredentialInvalid
#[derive(Debug)]
pub struct ApiClient {
    transport: RestClient,
    delete_body_codes: HashSet<StatusCode>,
}

impl ApiClient {
    /// Create a new ApiClient.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        Ok(Self {
            transport: RestClient::new(ctx, config)?,
            delete_body_codes: HashSet::new(),
        })
    }

    /// Declare non-success statuses whose DELETE responses still carry a
    /// usable body, reported as [`DeleteOutcome::Rejected`] instead of an
    /// error.
    pub fn with_delete_body_codes(
        mut self,
        codes: impl IntoIterator<Item = StatusCode>,
    ) -> Self {
        self.delete_body_codes = codes.into_iter().collect();
        self
    }

    /// Fetch one resource.
    ///
    /// A 400 answer is "not found" on this API and maps to `Ok(None)`.
    pub async fn get(
        &self,
        path: &str,
        params: Option<&[(String, String)]>,
    ) -> Result<Option<Value>> {
        let resp = self
            .transport
            .send(Method::GET, path, params, Bytes::new())
            .await?
            .ok_or_else(|| unsent_error("get"))?;

        match resp.status() {
            StatusCode::OK => decode_body(resp.body()),
            StatusCode::BAD_REQUEST => Ok(None),
            status => Err(api_error("get", status, resp.body())),
        }
    }

    /// Create a resource.
    pub async fn post(&self, path: &str, payload: &Value) -> Result<Option<Value>> {
        self.mutate(Method::POST, "post", path, payload).await
    }

    /// Replace a resource.
    pub async fn put(&self, path: &str, payload: &Value) -> Result<Option<Value>> {
        self.mutate(Method::PUT, "put", path, payload).await
    }

    /// Partially update a resource.
    pub async fn patch(&self, path: &str, payload: &Value) -> Result<Option<Value>> {
        self.mutate(Method::PATCH, "patch", path, payload).await
    }

    /// Delete a resource.
    ///
    /// The outcome says whether the server accepted the delete or refused
    /// it with one of the tolerated statuses declared via
    /// [`ApiClient::with_delete_body_codes`]. Any other non-success status
    /// is an error.
    pub async fn delete(&self, path: &str, payload: Option<&Value>) -> Result<DeleteOutcome> {
        let body = match payload {
            Some(payload) => encode_payload(payload)?,
            None => Bytes::new(),
        };
        let resp = self
            .transport
            .send(Method::DELETE, path, None, body)
            .await?
            .ok_or_else(|| unsent_error("delete"))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(DeleteOutcome::Deleted(decode_body(resp.body())?));
        }
        if self.delete_body_codes.contains(&status) {
            if let Some(body) = decode_body(resp.body())? {
                return Ok(DeleteOutcome::Rejected { status, body });
            }
        }

        Err(api_error("delete", status, resp.body()))
    }

    /// Dispatch one call by verb with the uniform JSON semantics.
    ///
    /// DELETE flattens a [`DeleteOutcome::Rejected`] body into the return
    /// value; callers that need the status use [`ApiClient::delete`].
    pub async fn run(
        &self,
        method: Method,
        path: &str,
        params: Option<&[(String, String)]>,
        payload: Option<&Value>,
    ) -> Result<Option<Value>> {
        if method == Method::GET {
            self.get(path, params).await
        } else if method == Method::POST || method == Method::PUT || method == Method::PATCH {
            let payload = payload.unwrap_or(&Value::Null);
            let op = method.as_str().to_ascii_lowercase();
            self.mutate(method.clone(), &op, path, payload).await
        } else if method == Method::DELETE {
            Ok(match self.delete(path, payload).await? {
                DeleteOutcome::Deleted(body) => body,
                DeleteOutcome::Rejected { body, .. } => Some(body),
            })
        } else {
            Err(Error::request_invalid(format!(
                "http method {method} is not dispatchable"
            )))
        }
    }

    async fn mutate(
        &self,
        method: Method,
        operation: &str,
        path: &str,
        payload: &Value,
    ) -> Result<Option<Value>> {
        let body = encode_payload(payload)?;
        let resp = self
            .transport
            .send(method, path, None, body)
            .await?
            .ok_or_else(|| unsent_error(operation))?;

        if resp.status().is_success() {
            decode_body(resp.body())
        } else {
            Err(api_error(operation, resp.status(), resp.body()))
        }
    }
}

// The transport withholds a response only when the credential chain came
// up empty. At this layer that is an error: a missing response must not
// look like a missing object.
fn unsent_error(operation: &str) -> Error {
    Error::credential_invalid("request was not sent: no credential available")
        .with_operation(operation)
}

fn encode_payload(payload: &Value) -> Result<Bytes> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| Error::unexpected("failed to encode request payload").with_source(e))?;
    Ok(Bytes::from(body))
}

fn decode_body(body: &Bytes) -> Result<Option<Value>> {
    if body.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| Error::unexpected("failed to decode response body").with_source(e))
}

fn api_error(operation: &str, status: StatusCode, body: &Bytes) -> Error {
    Error::api(String::from_utf8_lossy(body).into_owned())
        .with_status(status)
        .with_operation(operation)
}
