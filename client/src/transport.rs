//! Signed transport with bounded retry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, StatusCode};
use log::warn;
use once_cell::sync::Lazy;
use tetrapi_core::{Context, Error, ErrorKind, Result, Signer};

use crate::{Config, Credential, DefaultCredentialProvider, RequestSigner};

/// Fixed delay between retry attempts.
const SLEEP_BETWEEN_RETRIES: Duration = Duration::from_secs(2);

/// Status codes indicating a retryable, non-permanent failure.
const RETRY_STATUS: [StatusCode; 4] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// POST is absent: it is not idempotent and must never be replayed.
static RETRY_METHODS: Lazy<HashSet<Method>> =
    Lazy::new(|| HashSet::from([Method::GET, Method::PUT, Method::DELETE]));

static SUPPORTED_METHODS: Lazy<HashSet<Method>> = Lazy::new(|| {
    HashSet::from([
        Method::GET,
        Method::PUT,
        Method::POST,
        Method::DELETE,
        Method::PATCH,
    ])
});

/// RestClient sends signed requests to one OpenAPI endpoint.
///
/// It owns the signer and the retry policy but interprets no status codes:
/// whatever response the final attempt produced is handed to the caller.
///
/// `send` answers `Ok(None)` instead of an error when the verb is not
/// supported or no credential could be resolved. This soft-fail is
/// deliberate; callers that care must check for it.
#[derive(Debug)]
pub struct RestClient {
    ctx: Context,
    signer: Signer<Credential>,
    endpoint: String,
    uri_prefix: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl RestClient {
    /// Create a new RestClient from a config.
    ///
    /// Unset config fields are filled from `TETRATION_*` environment
    /// variables first, then defaults. A missing server endpoint, or a
    /// config with no credential source at all (no inline pair and no
    /// credentials file), is a fatal configuration error naming the
    /// missing option.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let config = config.from_env(&ctx);

        let endpoint = config
            .server_endpoint
            .clone()
            .ok_or_else(|| Error::config_invalid("option server_endpoint is required"))?;

        // A credentials file stands in for the inline pair; its contents
        // are checked when the file is loaded.
        if config.credentials_file.is_none() {
            if config.api_key.is_none() {
                return Err(Error::config_invalid("option api_key is required"));
            }
            if config.api_secret.is_none() {
                return Err(Error::config_invalid("option api_secret is required"));
            }
        }
        let uri_prefix = format!("/openapi/{}", config.api_version());
        let max_retries = config.max_retries();

        let config = Arc::new(config);
        let signer = Signer::new(
            ctx.clone(),
            DefaultCredentialProvider::new(config),
            RequestSigner::new(),
        );

        Ok(Self {
            ctx,
            signer,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            uri_prefix,
            max_retries,
            retry_delay: SLEEP_BETWEEN_RETRIES,
        })
    }

    /// Shrink the inter-attempt delay.
    ///
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Send one signed request and return the last response received.
    ///
    /// Idempotent verbs (GET, PUT, DELETE) are retried on transient
    /// statuses {429, 502, 503, 504} with a fixed delay, up to the
    /// configured attempt count. POST and PATCH get a single attempt. A
    /// network-level error surfaces only from the final attempt.
    ///
    /// Returns `Ok(None)` without sending anything when the verb is not in
    /// the supported set or no credential is available.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: Option<&[(String, String)]>,
        body: Bytes,
    ) -> Result<Option<http::Response<Bytes>>> {
        if !SUPPORTED_METHODS.contains(&method) {
            warn!("http method {method} is unsupported, request not sent");
            return Ok(None);
        }

        let uri = self.build_uri(path, params);
        let mut parts = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(())?
            .into_parts()
            .0;
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match self.signer.sign(&mut parts, &body).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::CredentialInvalid => {
                warn!("API key or secret is missing, request not sent: {e}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let attempts = if RETRY_METHODS.contains(&parts.method) {
            self.max_retries.max(1)
        } else {
            1
        };

        let mut last = None;
        for attempt in 1..=attempts {
            let req = clone_request(&parts, &body)?;
            match self.ctx.http_send(req).await {
                Ok(resp) => {
                    if !RETRY_STATUS.contains(&resp.status()) {
                        return Ok(Some(resp));
                    }
                    warn!(
                        "transient status {} from {} {} (attempt {attempt}/{attempts})",
                        resp.status(),
                        parts.method,
                        parts.uri
                    );
                    last = Some(resp);
                }
                Err(e) => {
                    if attempt == attempts {
                        return Err(e);
                    }
                    warn!("send failed on attempt {attempt}/{attempts}, retrying: {e}");
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Ok(last)
    }

    fn build_uri(&self, path: &str, params: Option<&[(String, String)]>) -> String {
        let mut uri = format!("{}{}", self.endpoint, self.prefix_path(path));

        if let Some(params) = params {
            if !params.is_empty() {
                let query = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params)
                    .finish();
                uri.push('?');
                uri.push_str(&query);
            }
        }

        uri
    }

    fn prefix_path(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        if path.starts_with(&self.uri_prefix) {
            path
        } else {
            format!("{}{}", self.uri_prefix, path)
        }
    }
}

fn clone_request(parts: &http::request::Parts, body: &Bytes) -> Result<http::Request<Bytes>> {
    let mut builder = http::Request::builder()
        .method(parts.method.clone())
        .uri(parts.uri.clone());
    if let Some(headers) = builder.headers_mut() {
        *headers = parts.headers.clone();
    }

    Ok(builder.body(body.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HEADER_CHECKSUM, HEADER_ID, HEADER_TIMESTAMP};
    use http::header::AUTHORIZATION;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tetrapi_core::HttpSend;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Status(u16, &'static str),
        NetworkError,
    }

    /// Scripted HttpSend that records every request it receives.
    #[derive(Debug, Clone, Default)]
    struct MockHttpSend {
        script: Arc<Mutex<VecDeque<Step>>>,
        seen: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    }

    impl MockHttpSend {
        fn scripted(steps: Vec<Step>) -> Self {
            Self {
                script: Arc::new(Mutex::new(steps.into())),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn request_count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left");
            self.seen.lock().unwrap().push(req);

            match step {
                Step::Status(status, body) => Ok(http::Response::builder()
                    .status(status)
                    .body(Bytes::from_static(body.as_bytes()))
                    .unwrap()),
                Step::NetworkError => Err(Error::unexpected("connection reset by peer")),
            }
        }
    }

    fn client(mock: &MockHttpSend, max_retries: u32) -> RestClient {
        let ctx = Context::new().with_http_send(mock.clone());
        let config = Config::new()
            .with_server_endpoint("https://tetration.example.com")
            .with_api_key("0123456789abcdef")
            .with_api_secret("fedcba9876543210")
            .with_max_retries(max_retries);

        RestClient::new(ctx, config)
            .unwrap()
            .with_retry_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_get_retries_until_success() {
        let mock = MockHttpSend::scripted(vec![
            Step::Status(503, ""),
            Step::Status(503, ""),
            Step::Status(200, "[]"),
        ]);
        let client = client(&mock, 3);

        let resp = client
            .send(Method::GET, "/users", None, Bytes::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_response() {
        let mock = MockHttpSend::scripted(vec![Step::Status(503, ""), Step::Status(503, "")]);
        let client = client(&mock, 2);

        let resp = client
            .send(Method::GET, "/users", None, Bytes::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_post_is_never_retried() {
        let mock = MockHttpSend::scripted(vec![Step::Status(503, "")]);
        let client = client(&mock, 3);

        let resp = client
            .send(
                Method::POST,
                "/users",
                None,
                Bytes::from_static(br#"{"name":"a"}"#),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_network_error_is_retried_then_succeeds() {
        let mock = MockHttpSend::scripted(vec![Step::NetworkError, Step::Status(200, "[]")]);
        let client = client(&mock, 2);

        let resp = client
            .send(Method::GET, "/users", None, Bytes::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_network_error_on_final_attempt_surfaces() {
        let mock = MockHttpSend::scripted(vec![Step::NetworkError, Step::NetworkError]);
        let client = client(&mock, 2);

        let err = client
            .send(Method::GET, "/users", None, Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_method_soft_fails() {
        let mock = MockHttpSend::scripted(vec![]);
        let client = client(&mock, 3);

        let resp = client
            .send(Method::TRACE, "/users", None, Bytes::new())
            .await
            .unwrap();
        assert!(resp.is_none());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected_at_construction() {
        let config = Config::new().with_server_endpoint("https://tetration.example.com");
        let err = RestClient::new(Context::new(), config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.to_string().contains("api_key"));

        let config = Config::new()
            .with_server_endpoint("https://tetration.example.com")
            .with_api_key("0123456789abcdef");
        let err = RestClient::new(Context::new(), config).unwrap_err();
        assert!(err.to_string().contains("api_secret"));
    }

    #[tokio::test]
    async fn test_credentials_file_satisfies_construction() {
        let config = Config::new()
            .with_server_endpoint("https://tetration.example.com")
            .with_credentials_file("~/.tetration/credentials.json");
        assert!(RestClient::new(Context::new(), config).is_ok());
    }

    #[tokio::test]
    async fn test_env_credentials_satisfy_construction() {
        use crate::constants::{TETRATION_API_KEY, TETRATION_API_SECRET};
        use tetrapi_core::StaticEnv;

        let ctx = Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: [
                (TETRATION_API_KEY.to_string(), "env_key".to_string()),
                (TETRATION_API_SECRET.to_string(), "env_secret".to_string()),
            ]
            .into(),
        });
        let config = Config::new().with_server_endpoint("https://tetration.example.com");
        assert!(RestClient::new(ctx, config).is_ok());
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_config_error() {
        let err = RestClient::new(Context::new(), Config::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.to_string().contains("server_endpoint"));
    }

    #[tokio::test]
    async fn test_requests_are_signed_and_prefixed() {
        let mock = MockHttpSend::scripted(vec![Step::Status(200, "[]")]);
        let client = client(&mock, 1);

        client
            .send(
                Method::GET,
                "/users",
                Some(&[("limit".to_string(), "100".to_string())]),
                Bytes::new(),
            )
            .await
            .unwrap();

        let seen = mock.seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(
            req.uri().to_string(),
            "https://tetration.example.com/openapi/v1/users?limit=100"
        );
        assert!(req.headers().get(AUTHORIZATION).is_some());
        assert!(req.headers().get(HEADER_ID).is_some());
        assert!(req.headers().get(HEADER_TIMESTAMP).is_some());
        // GET carries no checksum header.
        assert!(req.headers().get(HEADER_CHECKSUM).is_none());
    }

    #[tokio::test]
    async fn test_already_prefixed_path_is_not_doubled() {
        let mock = MockHttpSend::scripted(vec![Step::Status(200, "[]")]);
        let client = client(&mock, 1);

        client
            .send(Method::GET, "/openapi/v1/roles", None, Bytes::new())
            .await
            .unwrap();

        let seen = mock.seen.lock().unwrap();
        assert_eq!(
            seen[0].uri().to_string(),
            "https://tetration.example.com/openapi/v1/roles"
        );
    }
}
