//! Tracks the one disk image this process may have attached.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

use crate::core::{LauncherError, Result};
use crate::platform::{DiskImageMounter, FileSystem};

/// A fresh mount point below `temp_dir`. Unique per call, so repeated runs
/// never collide.
pub fn fresh_mount_point(temp_dir: &Path) -> PathBuf {
    temp_dir.join(Uuid::new_v4().to_string())
}

/// Wraps a [`DiskImageMounter`] with "at most one image mounted" state.
///
/// Shared between the installer, which attaches and detaches during install,
/// and the orchestrator, which closes it on cancel or failure. A closed
/// manager detaches what it holds and refuses further attaches.
pub struct DiskImageManager {
    mounter: Arc<dyn DiskImageMounter>,
    fs: Arc<dyn FileSystem>,
    state: Mutex<MountState>,
}

#[derive(Debug, Default)]
struct MountState {
    mount_point: Option<PathBuf>,
    closed: bool,
}

impl DiskImageManager {
    /// Create a manager with nothing mounted.
    pub fn new(mounter: Arc<dyn DiskImageMounter>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            mounter,
            fs,
            state: Mutex::new(MountState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MountState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach `image` at `mount_point`.
    ///
    /// Fails with [`LauncherError::AlreadyMounted`] while another image is
    /// attached, with [`LauncherError::ArchiveMissing`] if `image` does not
    /// exist and with [`LauncherError::Cancelled`] after [`Self::close`].
    pub fn attach(&self, image: &Path, mount_point: &Path) -> Result<()> {
        let mut state = self.state();

        if state.closed {
            debug!("Refusing to attach {} after close", image.display());
            return Err(LauncherError::Cancelled);
        }
        if let Some(current) = state.mount_point.as_ref() {
            return Err(LauncherError::AlreadyMounted {
                mount_point: current.display().to_string(),
            });
        }
        if !self.fs.exists(image) {
            return Err(LauncherError::ArchiveMissing {
                path: image.display().to_string(),
            });
        }

        debug!("Attaching {} at {}", image.display(), mount_point.display());
        self.mounter.attach(image, mount_point)?;
        state.mount_point = Some(mount_point.to_path_buf());
        Ok(())
    }

    /// Detach the current image. A no-op when nothing is mounted.
    pub fn detach(&self) -> Result<()> {
        let mut state = self.state();
        Self::detach_locked(&*self.mounter, &mut state)
    }

    /// Detach the current image and refuse every later attach.
    ///
    /// Holds the lock across both, so an attach racing with close either
    /// completes first and is detached here or fails.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state();
        state.closed = true;
        Self::detach_locked(&*self.mounter, &mut state)
    }

    fn detach_locked(mounter: &dyn DiskImageMounter, state: &mut MountState) -> Result<()> {
        if let Some(mount_point) = state.mount_point.take() {
            debug!("Detaching {}", mount_point.display());
            mounter.detach(&mount_point)?;
        }
        Ok(())
    }

    /// Where the current image is mounted.
    pub fn mount_point(&self) -> Option<PathBuf> {
        self.state().mount_point.clone()
    }

    /// Whether [`Self::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Whether an image is attached.
    pub fn is_mounted(&self) -> bool {
        self.mount_point().is_some()
    }
}
