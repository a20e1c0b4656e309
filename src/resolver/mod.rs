//! Update resolution: from the mirror's index page to a concrete disk image URL.
//!
//! Resolution is two-staged so "which release is current" and "where is the
//! binary for this platform" can change independently:
//!
//! ```text
//! 1. Index
//!    ├── GET <update host>/?C=M;O=D          (newest first)
//!    └── first line matching `a href="update_<n>..."`  -> update_3/
//!
//! 2. Manifest
//!    ├── GET <mirror>/update_3/release/download-macos.json
//!    └── {"binary": "<url>"}                  -> ReleaseMetadata
//! ```
//!
//! Every failure is terminal. Nothing is retried here or by the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reqwest::Url;
//! use tor_browser_launcher::http::ReqwestClient;
//! use tor_browser_launcher::resolver::UpdateResolver;
//! use tor_browser_launcher::status::StatusSender;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = UpdateResolver::new(Arc::new(ReqwestClient::new(None)?), StatusSender::disconnected());
//! let index = Url::parse("https://aus1.torproject.org/torbrowser/?C=M;O=D")?;
//! let mirror = Url::parse("https://aus1.torproject.org/torbrowser/")?;
//! let release = resolver.resolve(&index, &mirror).await?;
//! println!("{} ({})", release.basename()?, release.binary_url);
//! # Ok(())
//! # }
//! ```

pub mod index;
pub mod manifest;

pub use index::{find_match_in_lines, find_update_path};
pub use manifest::{ReleaseMetadata, preferred_locales, system_locale};

use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::constants::{DEFAULT_MANIFEST_SUFFIX, MANIFEST_DISPLAY_NAME, UPDATE_INDEX_QUERY};
use crate::core::{LauncherError, Result};
use crate::http::HttpClient;
use crate::status::StatusSender;

/// The newest-first index listing below an update host prefix.
///
/// ```rust
/// use tor_browser_launcher::resolver::update_index_url;
///
/// let url = update_index_url("https://aus1.torproject.org/torbrowser/").unwrap();
/// assert_eq!(url.as_str(), "https://aus1.torproject.org/torbrowser/?C=M;O=D");
/// ```
pub fn update_index_url(prefix: &str) -> Result<Url> {
    parse_url(&format!("{prefix}{UPDATE_INDEX_QUERY}"))
}

/// Parse a configured URL, reporting failures as configuration errors.
pub fn parse_url(value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| LauncherError::Config {
        message: format!("Invalid URL '{value}': {e}"),
    })
}

/// Resolves the current release through an [`HttpClient`].
#[derive(Clone)]
pub struct UpdateResolver {
    http: Arc<dyn HttpClient>,
    status: StatusSender,
    manifest_suffix: String,
    locales: Vec<String>,
}

impl UpdateResolver {
    /// A resolver using the default manifest path and the system locale.
    pub fn new(http: Arc<dyn HttpClient>, status: StatusSender) -> Self {
        Self {
            http,
            status,
            manifest_suffix: DEFAULT_MANIFEST_SUFFIX.to_string(),
            locales: preferred_locales(system_locale().as_deref()),
        }
    }

    /// Read a different manifest below each release folder.
    #[must_use]
    pub fn with_manifest_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.manifest_suffix = suffix.into();
        self
    }

    /// Override the locale preference used for legacy manifests.
    #[must_use]
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        self
    }

    /// Resolve the current release.
    ///
    /// The index is always read from `index_url`. The manifest is looked up
    /// below `mirror_base_url`.
    #[instrument(skip(self), fields(index = %index_url, mirror = %mirror_base_url))]
    pub async fn resolve(&self, index_url: &Url, mirror_base_url: &Url) -> Result<ReleaseMetadata> {
        let response = self.http.fetch(index_url).await?;
        if !response.is_success() {
            return Err(LauncherError::BadStatus {
                url: index_url.to_string(),
                status: response.status,
            });
        }

        self.status.status("Finding update path.");
        let html = String::from_utf8(response.body).map_err(|e| LauncherError::Decode {
            what: "update index".to_string(),
            reason: e.to_string(),
        })?;
        let update_path = find_update_path(&html).ok_or(LauncherError::NoUpdatePath)?;
        debug!("Newest release folder: {update_path}");

        let manifest_url = self.manifest_url(mirror_base_url, update_path)?;
        self.status.status(format!("Fetching {MANIFEST_DISPLAY_NAME}."));
        let response = self.http.fetch(&manifest_url).await?;
        if !response.is_success() {
            return Err(LauncherError::BadStatus {
                url: manifest_url.to_string(),
                status: response.status,
            });
        }

        let metadata = ReleaseMetadata::parse(&response.body, &self.locales)?;
        metadata.basename()?;
        debug!(
            "Resolved {} (version {})",
            metadata.binary_url,
            metadata.version.as_deref().unwrap_or("unknown")
        );
        Ok(metadata)
    }

    /// `<mirror>/<update path>/<manifest suffix>`, tolerating missing or doubled
    /// slashes between the parts.
    pub fn manifest_url(&self, mirror_base_url: &Url, update_path: &str) -> Result<Url> {
        let mut base = mirror_base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let relative = format!(
            "{}/{}",
            update_path.trim_matches('/'),
            self.manifest_suffix.trim_start_matches('/')
        );
        base.join(&relative).map_err(|e| LauncherError::Config {
            message: format!("Invalid mirror URL '{mirror_base_url}': {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::test_utils::MockHttpClient;

    const INDEX: &str = "https://aus1.torproject.org/torbrowser/?C=M;O=D";
    const MIRROR: &str = "https://aus1.torproject.org/torbrowser/";
    const MANIFEST: &str =
        "https://aus1.torproject.org/torbrowser/update_3/release/download-macos.json";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn resolver(http: MockHttpClient) -> (UpdateResolver, crate::status::StatusReceiver) {
        let (status, receiver) = StatusSender::channel();
        let resolver =
            UpdateResolver::new(Arc::new(http), status).with_locales(preferred_locales(None));
        (resolver, receiver)
    }

    #[test]
    fn test_manifest_url_joining() {
        let (resolver, _) = resolver(MockHttpClient::new());

        for (mirror, path) in [
            ("https://aus1.torproject.org/torbrowser/", "update_3/"),
            ("https://aus1.torproject.org/torbrowser", "update_3"),
            ("https://aus1.torproject.org/torbrowser/", "/update_3"),
        ] {
            assert_eq!(resolver.manifest_url(&url(mirror), path).unwrap().as_str(), MANIFEST);
        }
    }

    #[test]
    fn test_custom_manifest_suffix() {
        let (resolver, _) = resolver(MockHttpClient::new());
        let resolver = resolver.with_manifest_suffix("/alpha/download-macos.json");

        let manifest = resolver.manifest_url(&url(MIRROR), "update_3/").unwrap();
        assert_eq!(
            manifest.as_str(),
            "https://aus1.torproject.org/torbrowser/update_3/alpha/download-macos.json"
        );
    }

    #[tokio::test]
    async fn test_resolve_happy_path() {
        let http = MockHttpClient::new()
            .with_response(INDEX, HttpResponse::ok("<a href=\"update_3/\">update_3/</a>\n"))
            .with_response(
                MANIFEST,
                HttpResponse::ok(r#"{"version":"14.5.6","binary":"https://x/tor-browser-macos-14.5.6.dmg"}"#),
            );
        let (resolver, mut receiver) = resolver(http);

        let release = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap();

        assert_eq!(release.basename().unwrap(), "tor-browser-macos-14.5.6.dmg");
        assert_eq!(release.version.as_deref(), Some("14.5.6"));
        assert_eq!(
            receiver.drain_statuses(),
            vec!["Finding update path.".to_string(), "Fetching downloads.json.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_index_bad_status() {
        let http = MockHttpClient::new().with_response(
            INDEX,
            HttpResponse {
                status: 503,
                body: Vec::new(),
            },
        );
        let (resolver, mut receiver) = resolver(http);

        let error = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap_err();

        assert!(matches!(
            error,
            LauncherError::BadStatus {
                status: 503,
                ..
            }
        ));
        assert!(receiver.drain_statuses().is_empty());
    }

    #[tokio::test]
    async fn test_index_transport_failure() {
        let (resolver, _) = resolver(MockHttpClient::new());
        let error = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap_err();
        assert!(matches!(error, LauncherError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_no_update_path() {
        let http = MockHttpClient::new()
            .with_response(INDEX, HttpResponse::ok("<a href=\"14.5.6/\">14.5.6/</a>\n"));
        let (resolver, _) = resolver(http);

        let error = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap_err();
        assert_eq!(error, LauncherError::NoUpdatePath);
    }

    #[tokio::test]
    async fn test_index_not_utf8() {
        let http = MockHttpClient::new().with_response(INDEX, HttpResponse::ok(vec![0xff, 0xfe, 0x00]));
        let (resolver, _) = resolver(http);

        let error = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap_err();
        assert!(matches!(error, LauncherError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_manifest_without_binary() {
        let http = MockHttpClient::new()
            .with_response(INDEX, HttpResponse::ok("<a href=\"update_3/\">update_3/</a>"))
            .with_response(MANIFEST, HttpResponse::ok(r#"{"version":"14.5.6"}"#));
        let (resolver, mut receiver) = resolver(http);

        let error = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap_err();

        assert_eq!(error, LauncherError::NoBinaryUrl);
        assert!(receiver.drain_statuses().contains(&"Finding update path.".to_string()));
    }

    #[tokio::test]
    async fn test_manifest_with_invalid_binary() {
        let http = MockHttpClient::new()
            .with_response(INDEX, HttpResponse::ok("<a href=\"update_3/\">update_3/</a>"))
            .with_response(MANIFEST, HttpResponse::ok(r#"{"binary":"::not a url::"}"#));
        let (resolver, _) = resolver(http);

        let error = resolver.resolve(&url(INDEX), &url(MIRROR)).await.unwrap_err();
        assert!(matches!(error, LauncherError::InvalidBinaryUrl { .. }));
    }

    #[tokio::test]
    async fn test_manifest_from_alternate_mirror() {
        let mirror = "https://tor.example.org/dist/";
        let http = MockHttpClient::new()
            .with_response(INDEX, HttpResponse::ok("<a href=\"update_3/\">update_3/</a>"))
            .with_response(
                "https://tor.example.org/dist/update_3/release/download-macos.json",
                HttpResponse::ok(r#"{"binary":"https://tor.example.org/dist/a.dmg"}"#),
            );
        let (resolver, _) = resolver(http);

        let release = resolver.resolve(&url(INDEX), &url(mirror)).await.unwrap();
        assert_eq!(release.basename().unwrap(), "a.dmg");
    }
}
