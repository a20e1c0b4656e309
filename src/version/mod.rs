//! The installed version marker.
//!
//! The marker is a plain UTF-8 file holding exactly the archive basename of
//! the last installed build, for example `tor-browser-macos-14.5.6.dmg`. It is
//! the only record consulted when deciding whether an update is needed, and
//! it is compared by exact string equality, never by version ordering.
//!
//! The bundle counts as installed only when the marker **and** the bundle
//! directory both exist.

use std::sync::Arc;

use tracing::debug;

use crate::config::LauncherPaths;
use crate::core::Result;
use crate::platform::FileSystem;

/// Reads and writes the installed version marker.
#[derive(Clone)]
pub struct VersionStore {
    paths: LauncherPaths,
    fs: Arc<dyn FileSystem>,
}

impl VersionStore {
    /// Create a store for the marker under `paths`.
    pub fn new(paths: LauncherPaths, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            paths,
            fs,
        }
    }

    /// The recorded basename, or `None` when nothing was ever installed.
    ///
    /// The content is returned verbatim.
    pub fn load(&self) -> Result<Option<String>> {
        self.fs.read_string(&self.paths.version_marker_path())
    }

    /// Record `basename` as the installed build, creating the install root.
    pub fn store(&self, basename: &str) -> Result<()> {
        debug!("Recording installed build {basename}");
        self.fs.create_dir_all(self.paths.install_root())?;
        self.fs.write_string(&self.paths.version_marker_path(), basename)
    }

    /// Forget the installed build.
    pub fn clear(&self) -> Result<()> {
        self.fs.remove_if_exists(&self.paths.version_marker_path())
    }

    /// Both the marker and the bundle directory are present.
    pub fn is_installed(&self) -> bool {
        self.fs.exists(&self.paths.version_marker_path())
            && self.fs.exists(&self.paths.bundle_path())
    }

    /// The recorded basename, but only when [`is_installed`](Self::is_installed).
    pub fn installed_version(&self) -> Result<Option<String>> {
        if !self.is_installed() {
            return Ok(None);
        }
        self.load()
    }

    /// Whether `basename` is the build that is installed right now.
    pub fn is_current(&self, basename: &str) -> Result<bool> {
        Ok(self.installed_version()?.as_deref() == Some(basename))
    }
}
