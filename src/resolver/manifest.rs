//! Per-release manifest parsing.
//!
//! The current manifest format is a flat object:
//!
//! ```json
//! {"version": "14.5.6", "binary": "https://.../tor-browser-macos-14.5.6.dmg"}
//! ```
//!
//! Two older locale-keyed layouts are still accepted. The binary is picked by
//! walking [`preferred_locales`] in order:
//!
//! ```json
//! {"version": "9.0", "binary": {"en-US": "https://...", "de": "https://..."}}
//! {"downloads": {"macos": {"en-US": {"binary": "https://..."}}}}
//! ```

use reqwest::Url;
use serde_json::Value;

use crate::core::{LauncherError, Result};

const FALLBACK_LOCALE: &str = "en-US";

/// What the resolver learned about the current release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    /// Download location of the disk image, as written in the manifest
    pub binary_url: String,
    /// Release version, when the manifest names one
    pub version: Option<String>,
}

impl ReleaseMetadata {
    /// Parse a manifest body.
    ///
    /// Malformed JSON and a missing binary both yield
    /// [`LauncherError::NoBinaryUrl`]: either way there is nothing to download.
    pub fn parse(body: &[u8], locales: &[String]) -> Result<Self> {
        let document: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Manifest is not valid JSON: {e}");
            LauncherError::NoBinaryUrl
        })?;

        let version = document.get("version").and_then(Value::as_str).map(str::to_string);

        let binary = match document.get("binary") {
            Some(Value::String(url)) => Some(url.clone()),
            Some(Value::Object(by_locale)) => {
                pick_locale(locales, |locale| by_locale.get(locale).and_then(Value::as_str))
            }
            _ => document
                .get("downloads")
                .and_then(|d| d.get("macos"))
                .and_then(|by_locale| {
                    pick_locale(locales, |locale| {
                        by_locale.get(locale)?.get("binary").and_then(Value::as_str)
                    })
                }),
        };

        let binary_url = binary.ok_or(LauncherError::NoBinaryUrl)?;
        Ok(Self {
            binary_url,
            version,
        })
    }

    /// The binary location as an absolute URL.
    pub fn url(&self) -> Result<Url> {
        Url::parse(&self.binary_url).map_err(|_| self.invalid())
    }

    /// Last path component of the binary URL, e.g. `tor-browser-macos-14.5.6.dmg`.
    ///
    /// This is the value stored in the version marker.
    pub fn basename(&self) -> Result<String> {
        self.url()?
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(str::to_string)
            .ok_or_else(|| self.invalid())
    }

    fn invalid(&self) -> LauncherError {
        LauncherError::InvalidBinaryUrl {
            url: self.binary_url.clone(),
        }
    }
}

fn pick_locale<'a>(
    locales: &[String],
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Option<String> {
    locales.iter().find_map(|locale| lookup(locale.as_str())).map(str::to_string)
}

/// Locale preference list for the legacy manifests.
///
/// `zh-Hans`/`zh-Hant` script tags become `zh-CN`/`zh-TW`, a region-qualified
/// locale is followed by its bare language, and `en-US` always comes last.
///
/// ```rust
/// use tor_browser_launcher::resolver::preferred_locales;
///
/// assert_eq!(preferred_locales(Some("pt-BR")), vec!["pt-BR", "pt", "en-US"]);
/// assert_eq!(preferred_locales(None), vec!["en-US"]);
/// ```
pub fn preferred_locales(locale: Option<&str>) -> Vec<String> {
    let mut locales = Vec::new();

    if let Some(locale) = locale.map(str::trim).filter(|l| !l.is_empty()) {
        let locale = locale.replace("-Hans", "-CN").replace("-Hant", "-TW");
        let language = locale.split_once('-').map(|(language, _)| language.to_string());
        locales.push(locale);
        locales.extend(language);
    }

    if !locales.iter().any(|l| l == FALLBACK_LOCALE) {
        locales.push(FALLBACK_LOCALE.to_string());
    }
    locales
}

/// The user's locale from `LC_ALL`, `LC_MESSAGES` or `LANG`, in BCP 47 form.
///
/// `de_DE.UTF-8` becomes `de-DE`. The `C` and `POSIX` locales count as unset.
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| {
            let tag = value.split(['.', '@']).next().unwrap_or_default().replace('_', "-");
            (!tag.is_empty() && tag != "C" && tag != "POSIX").then_some(tag)
        })
}
