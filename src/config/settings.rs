//! Persisted user preferences.
//!
//! Settings live in `settings.toml` inside the install root:
//!
//! ```toml
//! mirror_index = 1
//! proxy_address = "127.0.0.1:9050"
//! use_proxy = true
//! ```
//!
//! Missing keys fall back to their defaults, and a missing file is the same
//! as an empty one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::constants::{DEFAULT_PROXY_ADDRESS, MIRRORS};

/// Mirror choice and proxy preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Index into [`MIRRORS`].
    #[serde(default)]
    pub mirror_index: usize,

    /// `host:port` of an HTTP proxy, used only when `use_proxy` is set.
    #[serde(default = "default_proxy_address")]
    pub proxy_address: String,

    /// Whether downloads go through `proxy_address`.
    #[serde(default)]
    pub use_proxy: bool,
}

fn default_proxy_address() -> String {
    DEFAULT_PROXY_ADDRESS.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mirror_index: 0,
            proxy_address: default_proxy_address(),
            use_proxy: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file does not exist.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// Write settings to `path`, creating the parent directory.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// The selected mirror. Out-of-range indices fall back to the first mirror.
    #[must_use]
    pub fn mirror(&self) -> &'static str {
        MIRRORS.get(self.mirror_index).copied().unwrap_or(MIRRORS[0])
    }

    /// The proxy to use for this run, if any.
    #[must_use]
    pub fn effective_proxy(&self) -> Option<&str> {
        self.use_proxy.then_some(self.proxy_address.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.mirror_index, 0);
        assert_eq!(settings.proxy_address, "127.0.0.1:9010");
        assert!(!settings.use_proxy);
        assert_eq!(settings.effective_proxy(), None);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp.path().join("settings.toml")).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("settings.toml");
        let settings = Settings {
            mirror_index: 2,
            proxy_address: "10.0.0.1:8118".to_string(),
            use_proxy: true,
        };

        settings.save_to(&path).await.unwrap();
        let loaded = Settings::load_from(&path).await.unwrap();

        assert_eq!(loaded, settings);
        assert_eq!(loaded.effective_proxy(), Some("10.0.0.1:8118"));
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        fs::write(&path, "use_proxy = true\n").await.unwrap();

        let loaded = Settings::load_from(&path).await.unwrap();
        assert!(loaded.use_proxy);
        assert_eq!(loaded.proxy_address, "127.0.0.1:9010");
    }

    #[test]
    fn test_mirror_out_of_range_falls_back() {
        let settings = Settings {
            mirror_index: 999,
            ..Settings::default()
        };
        assert_eq!(settings.mirror(), MIRRORS[0]);
    }
}
