//! Installing a downloaded disk image.
//!
//! [`ArchiveInstaller::install`] replaces the installed bundle with the one
//! inside a freshly downloaded disk image:
//!
//! ```text
//! 1. Write version marker           <install root>/version = <basename>
//! 2. Place the archive              <download dir>/<basename>
//! 3. Mount                          <tmp>/<uuid>   (read-only, private, no browse)
//! 4. Remove old bundle              <install root>/Tor Browser.app
//! 5. Copy bundle                    <mount>/Tor Browser.app -> install root
//! 6. Unmount
//! 7. Strip quarantine attribute     recursively below the new bundle
//! 8. Remove the archive             (failure only logged)
//! ```
//!
//! Steps 1 to 7 are fatal on failure and nothing is rolled back. The marker is
//! written before the bundle is in place, so a crash between steps 1 and 5
//! leaves a marker naming a build that is not installed.
//!
//! All operations block. The orchestrator runs [`ArchiveInstaller::install`] on
//! the blocking pool, so a cancelled run cannot interrupt a step. The token set
//! with [`ArchiveInstaller::with_cancellation`] is checked before every step
//! except unmount and archive removal; once it fires, install stops with
//! [`LauncherError::Cancelled`] and leaves any mounted image to the
//! orchestrator's cleanup.

pub mod dmg;
pub mod launch;

pub use dmg::{DiskImageManager, fresh_mount_point};
pub use launch::launch_and_quit;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::LauncherPaths;
use crate::constants::APP_BUNDLE_NAME;
use crate::core::{LauncherError, Result};
use crate::platform::FileSystem;
use crate::status::StatusSender;
use crate::version::VersionStore;

/// Replaces the installed bundle from a downloaded disk image.
#[derive(Clone)]
pub struct ArchiveInstaller {
    paths: LauncherPaths,
    fs: Arc<dyn FileSystem>,
    disk_images: Arc<DiskImageManager>,
    versions: VersionStore,
    status: StatusSender,
    cancel: CancellationToken,
}

impl ArchiveInstaller {
    /// Create an installer.
    pub fn new(
        paths: LauncherPaths,
        fs: Arc<dyn FileSystem>,
        disk_images: Arc<DiskImageManager>,
        status: StatusSender,
    ) -> Self {
        let versions = VersionStore::new(paths.clone(), fs.clone());
        Self {
            paths,
            fs,
            disk_images,
            versions,
            status,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between steps once `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn checkpoint(&self, next: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            info!("Install cancelled before {next}");
            return Err(LauncherError::Cancelled);
        }
        Ok(())
    }

    /// Install the bundle from the disk image at `downloaded`, recording
    /// `basename` as the installed build.
    pub fn install(&self, downloaded: &Path, basename: &str) -> Result<()> {
        let bundle = self.paths.bundle_path();

        self.checkpoint("writing the version marker")?;
        self.versions.store(basename)?;

        let archive = downloaded.with_file_name(basename);
        if archive != downloaded {
            self.checkpoint("placing the archive")?;
            self.fs.remove_if_exists(&archive)?;
            self.fs.move_item(downloaded, &archive)?;
        }

        self.checkpoint("mounting")?;
        self.status.status(format!("Mounting {basename}."));
        let mount_point = fresh_mount_point(self.paths.temp_dir());
        self.disk_images.attach(&archive, &mount_point)?;

        self.checkpoint("removing the old bundle")?;
        self.status.status("Removing old version.");
        self.fs.remove_if_exists(&bundle)?;

        self.checkpoint("copying")?;
        self.status.status("Copying app bundle.");
        self.fs.copy_tree(&mount_point.join(APP_BUNDLE_NAME), &bundle)?;

        self.status.status(format!("Unmounting {basename}."));
        self.disk_images.detach()?;

        self.checkpoint("stripping quarantine")?;
        self.status.status("Removing quarantine attributes.");
        self.fs.strip_quarantine(&bundle)?;

        if let Err(e) = self.fs.remove_if_exists(&archive) {
            warn!("Failed to remove {}: {e}", archive.display());
        }

        info!("Installed {basename} at {}", bundle.display());
        Ok(())
    }

    /// Remove the installed bundle and forget the installed build.
    pub fn uninstall(&self) -> Result<()> {
        let bundle = self.paths.bundle_path();
        self.status.status(format!("Removing {}.", bundle.display()));
        self.fs.remove_if_exists(&bundle)?;
        self.versions.clear()?;
        info!("Uninstalled {}", bundle.display());
        Ok(())
    }

    /// The version store this installer writes to.
    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }
}
