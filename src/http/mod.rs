//! HTTP access to the update mirror.
//!
//! The pipeline talks to the network through [`HttpClient`] so tests can serve
//! index pages and manifests from memory. [`ReqwestClient`] is the production
//! implementation; it supports an optional `host:port` HTTP proxy and also
//! serves `file://` URLs from disk, which lets a local directory act as a mirror.

pub mod client;

pub use client::{ReqwestClient, parse_proxy};

use async_trait::async_trait;
use reqwest::Url;
use std::path::Path;

use crate::core::Result;

/// Callback receiving `(bytes_written, bytes_expected)` during a download.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code (200 for `file://` reads)
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A 200 response with `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Status in 200-299.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network collaborator of the resolver and the downloader.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch `url` into memory. Non-2xx statuses are returned, not raised.
    async fn fetch(&self, url: &Url) -> Result<HttpResponse>;

    /// Stream `url` into `destination`, reporting progress. Returns the number
    /// of bytes written. Non-2xx statuses fail with `BadStatus`.
    async fn download(&self, url: &Url, destination: &Path, progress: ProgressFn<'_>)
    -> Result<u64>;
}
