//! Client for the Tetration OpenAPI.
//!
//! This crate turns the building blocks from `tetrapi-core` into a working
//! client for the platform's `/openapi/{version}` REST surface:
//!
//! - [`Config`] collects endpoint, credentials, and transport options, with
//!   `TETRATION_*` environment fallback;
//! - [`RequestSigner`] attaches the platform's auth headers (`Authorization`,
//!   `Id`, `Timestamp`, `X-Tetration-Cksum`);
//! - [`RestClient`] sends signed requests and retries idempotent verbs on
//!   transient status codes;
//! - [`ApiClient`] exposes GET/POST/PUT/DELETE with uniform JSON semantics,
//!   offset-cursor pagination, and the [`is_subset`] differ that gives
//!   resource modules their idempotent "no-op if already correct" behavior.
//!
//! ## Example
//!
//! ```no_run
//! use tetrapi_client::{ApiClient, Config};
//! use tetrapi_core::{Context, OsEnv};
//! use tetrapi_file_read_tokio::TokioFileRead;
//! use tetrapi_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> tetrapi_core::Result<()> {
//! let config = Config::new()
//!     .with_server_endpoint("https://tetration.example.com")
//!     .with_credentials_file("~/.tetration/credentials.json");
//!
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::with_options(true, config.timeout())?)
//!     .with_env(OsEnv);
//!
//! let client = ApiClient::new(ctx, config)?;
//! let users = client.fetch_all("/users", None, None).await?;
//! println!("{} users", users.len());
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::{
    ConfigCredentialProvider, CredentialsFileProvider, DefaultCredentialProvider,
    EnvCredentialProvider, StaticCredentialProvider,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod transport;
pub use transport::RestClient;

mod resource;
pub use resource::{ApiClient, DeleteOutcome};

mod paginate;

mod convergence;
pub use convergence::is_subset;
