//! Tokio-based file reading for tetrapi.
//!
//! This crate provides [`TokioFileRead`], an async file reader implementing
//! the `FileRead` trait from `tetrapi-core` on top of Tokio's file system
//! operations. It is the piece that lets credential providers load the
//! credentials file without blocking the runtime.
//!
//! ## Example
//!
//! ```no_run
//! use tetrapi_core::{Context, OsEnv};
//! use tetrapi_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("~/.tetration/credentials.json").await {
//!         Ok(content) => println!("read {} bytes", content.len()),
//!         Err(e) => eprintln!("failed to read file: {e}"),
//!     }
//! }
//! ```

use async_trait::async_trait;
use tetrapi_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }
}
