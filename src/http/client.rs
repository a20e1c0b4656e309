//! reqwest-backed [`HttpClient`].

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::{HttpClient, HttpResponse, ProgressFn};
use crate::constants::HTTP_CONNECT_TIMEOUT;
use crate::core::{LauncherError, Result};

/// Split a `host:port` proxy address.
///
/// ```rust
/// use tor_browser_launcher::http::parse_proxy;
///
/// assert_eq!(parse_proxy("127.0.0.1:9010").unwrap(), ("127.0.0.1".to_string(), 9010));
/// assert!(parse_proxy("localhost").is_err());
/// ```
pub fn parse_proxy(address: &str) -> Result<(String, u16)> {
    let invalid = || LauncherError::Config {
        message: format!("Invalid proxy address '{address}', expected host:port"),
    };

    let (host, port) = address.trim().rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}

/// Production HTTP client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client, routing every request through `proxy` when given.
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("tor-browser-launcher/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(HTTP_CONNECT_TIMEOUT);

        if let Some(address) = proxy {
            let (host, port) = parse_proxy(address)?;
            let proxy = reqwest::Proxy::all(format!("http://{host}:{port}")).map_err(|e| {
                LauncherError::Config {
                    message: format!("Invalid proxy address '{address}': {e}"),
                }
            })?;
            debug!("Using HTTP proxy {host}:{port}");
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| LauncherError::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
        })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        self.client.get(url.clone()).send().await.map_err(|e| transport(url, e))
    }
}

fn transport(url: &Url, err: impl std::fmt::Display) -> LauncherError {
    LauncherError::Transport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

fn local_path(url: &Url) -> Result<std::path::PathBuf> {
    url.to_file_path().map_err(|()| transport(url, "not a local path"))
}

#[async_trait]
impl HttpClient for ReqwestClient {
    #[instrument(name = "ReqwestClient::fetch", skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<HttpResponse> {
        if url.scheme() == "file" {
            let body = fs::read(local_path(url)?).await.map_err(|e| transport(url, e))?;
            return Ok(HttpResponse::ok(body));
        }

        let response = self.send(url).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| transport(url, e))?;
        debug!("{} bytes, status {}", body.len(), status);

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    #[instrument(name = "ReqwestClient::download", skip(self, progress), fields(url = %url))]
    async fn download(
        &self,
        url: &Url,
        destination: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<u64> {
        if url.scheme() == "file" {
            let written = fs::copy(local_path(url)?, destination)
                .await
                .map_err(|e| transport(url, e))?;
            progress(written, Some(written));
            return Ok(written);
        }

        let response = self.send(url).await?;
        if !response.status().is_success() {
            return Err(LauncherError::BadStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let expected = response.content_length();
        let mut file = fs::File::create(destination)
            .await
            .map_err(|e| LauncherError::fs("create file", destination, e))?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| LauncherError::fs("write file", destination, e))?;
            written += chunk.len() as u64;
            progress(written, expected);
        }

        file.flush().await.map_err(|e| LauncherError::fs("write file", destination, e))?;
        debug!("Downloaded {written} bytes to {}", destination.display());
        Ok(written)
    }
}
