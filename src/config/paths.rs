//! On-disk locations used by the launcher.
//!
//! Every component receives a [`LauncherPaths`] at construction instead of
//! reading process-wide globals, so tests can point the whole pipeline at a
//! temporary directory.

use std::path::{Path, PathBuf};

use crate::constants::{APP_BUNDLE_NAME, APP_SUPPORT_DIR_NAME, SETTINGS_FILE, VERSION_MARKER_FILE};
use crate::core::{LauncherError, Result};

/// Install root, bundle path, marker path and scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    install_root: PathBuf,
    temp_dir: PathBuf,
}

impl LauncherPaths {
    /// Paths rooted at an explicit install root. Scratch files go to the
    /// system temporary directory.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Paths below the platform application-support directory
    /// (`~/Library/Application Support/Tor Browser Launcher` on macOS).
    ///
    /// `TBL_INSTALL_ROOT` overrides the location.
    pub fn from_environment() -> Result<Self> {
        if let Ok(root) = std::env::var("TBL_INSTALL_ROOT") {
            return Ok(Self::new(root));
        }

        let base = dirs::data_dir().ok_or_else(|| LauncherError::Config {
            message: "Unable to determine application support directory".to_string(),
        })?;

        Ok(Self::new(base.join(APP_SUPPORT_DIR_NAME)))
    }

    /// Use a different scratch directory for mount points.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// The launcher's application-support directory.
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// The installed `Tor Browser.app` bundle.
    pub fn bundle_path(&self) -> PathBuf {
        self.install_root.join(APP_BUNDLE_NAME)
    }

    /// The installed version marker.
    pub fn version_marker_path(&self) -> PathBuf {
        self.install_root.join(VERSION_MARKER_FILE)
    }

    /// The persisted settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.install_root.join(SETTINGS_FILE)
    }

    /// Where fresh mount points are created.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }
}
