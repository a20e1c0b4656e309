//! Host collaborators of the install pipeline.
//!
//! The pipeline never touches the operating system directly. It goes through
//! three traits, each with a production implementation here and a recording
//! double in [`crate::test_utils`]:
//!
//! - [`FileSystem`] - file and directory operations plus quarantine stripping
//! - [`DiskImageMounter`] - attaching and detaching disk images
//! - [`AppOpener`] - opening the installed application
//!
//! All methods are blocking. Async callers run them on the blocking pool.

pub mod fs;
pub mod hdiutil;
pub mod opener;
#[cfg(target_os = "macos")]
mod workspace;

pub use fs::StdFileSystem;
pub use hdiutil::Hdiutil;
pub use opener::SystemOpener;

use std::path::Path;

use crate::core::Result;

/// File and directory operations used by the installer and the version store.
pub trait FileSystem: Send + Sync {
    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and its parents. An existing directory is not an error.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Recursively copy the directory tree at `from` to `to`.
    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()>;

    /// Move `from` to `to`.
    fn move_item(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a file or directory tree if present.
    fn remove_if_exists(&self, path: &Path) -> Result<()>;

    /// Write `content` to `path`, replacing it.
    fn write_string(&self, path: &Path, content: &str) -> Result<()>;

    /// Read `path` as UTF-8, or `None` if it does not exist.
    fn read_string(&self, path: &Path) -> Result<Option<String>>;

    /// Recursively strip the download-quarantine attribute below `path`.
    fn strip_quarantine(&self, path: &Path) -> Result<()>;
}

/// Attach and detach disk images.
pub trait DiskImageMounter: Send + Sync {
    /// Mount `image` read-only and private at `mount_point`.
    fn attach(&self, image: &Path, mount_point: &Path) -> Result<()>;

    /// Unmount `mount_point`.
    fn detach(&self, mount_point: &Path) -> Result<()>;
}

/// Open an application bundle.
pub trait AppOpener: Send + Sync {
    /// Open `bundle` passing `args`, without adding it to recent items.
    fn open(&self, bundle: &Path, args: &[String]) -> Result<()>;
}
