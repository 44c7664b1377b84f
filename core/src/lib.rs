//! Core components for signing Tetration OpenAPI requests.
//!
//! This crate provides the foundational types and traits shared by the
//! tetrapi crates. It defines the abstractions that let the signing and
//! transport layers stay independent of any concrete HTTP client, file
//! system, or process environment.
//!
//! ## Overview
//!
//! The crate is built around a few key concepts:
//!
//! - **Context**: a container holding implementations for file reading,
//!   HTTP sending, and environment access
//! - **Traits**: abstract interfaces for credential loading
//!   ([`ProvideCredential`]) and request signing ([`SignRequest`])
//! - **Signer**: the orchestrator that loads a credential once and signs
//!   every outgoing request with it
//!
//! ## Example
//!
//! ```no_run
//! use tetrapi_core::{
//!     Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential,
//! };
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for MyProvider {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-api-key".to_string(),
//!             secret: "my-api-secret".to_string(),
//!         }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! #[async_trait]
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         _parts: &mut http::request::Parts,
//!         _body: &[u8],
//!         _cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         todo!()
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::default();
//! let signer = Signer::new(ctx, MyProvider, MySigner);
//!
//! let mut parts = http::Request::builder()
//!     .method("GET")
//!     .uri("https://example.com/openapi/v1/users")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//!
//! signer.sign(&mut parts, b"").await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
mod env;
pub use env::{Env, OsEnv, StaticEnv};
mod fs;
pub use fs::FileRead;
mod http_send;
pub use http_send::HttpSend;

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
