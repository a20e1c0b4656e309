//! [`FileSystem`] backed by `std::fs`.

use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::FileSystem;
use crate::constants::QUARANTINE_ATTRIBUTE;
use crate::core::{LauncherError, Result};

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        // Broken symlinks count as present so they get removed.
        path.symlink_metadata().is_ok()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| LauncherError::fs("create directory", path, e))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        debug!("Copying {} to {}", from.display(), to.display());

        for entry in WalkDir::new(from).follow_links(false) {
            let entry = entry.map_err(|e| LauncherError::FileSystem {
                operation: "walk directory".to_string(),
                path: from.display().to_string(),
                reason: e.to_string(),
            })?;

            let relative = entry.path().strip_prefix(from).map_err(|e| {
                LauncherError::FileSystem {
                    operation: "copy tree".to_string(),
                    path: entry.path().display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            let target = to.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|e| LauncherError::fs("create directory", &target, e))?;
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)
                    .map_err(|e| LauncherError::fs("copy file", &target, e))?;
            }
        }

        Ok(())
    }

    fn move_item(&self, from: &Path, to: &Path) -> Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(_) if from.is_file() => {
                // Cross-device: fall back to copy then delete.
                fs::copy(from, to).map_err(|e| LauncherError::fs("move file", to, e))?;
                fs::remove_file(from).map_err(|e| LauncherError::fs("remove file", from, e))
            }
            Err(e) => Err(LauncherError::fs("move", from, e)),
        }
    }

    fn remove_if_exists(&self, path: &Path) -> Result<()> {
        let Ok(metadata) = path.symlink_metadata() else {
            return Ok(());
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| LauncherError::fs("remove", path, e))
    }

    fn write_string(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|e| LauncherError::fs("write file", path, e))
    }

    fn read_string(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LauncherError::fs("read file", path, e)),
        }
    }

    fn strip_quarantine(&self, path: &Path) -> Result<()> {
        if !cfg!(target_os = "macos") {
            debug!("No quarantine attributes on this platform");
            return Ok(());
        }

        let output = Command::new("/usr/bin/xattr")
            .args(["-dr", QUARANTINE_ATTRIBUTE])
            .arg(path)
            .output()
            .map_err(|e| LauncherError::fs("run xattr", path, e))?;

        if !output.status.success() {
            // xattr exits non-zero when no file carried the attribute.
            warn!(
                "xattr exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from).map_err(|e| LauncherError::fs("read link", from, e))?;
    std::os::unix::fs::symlink(&target, to).map_err(|e| LauncherError::fs("create link", to, e))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map(|_| ()).map_err(|e| LauncherError::fs("copy file", to, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_copies_nested_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.app");
        fs::create_dir_all(src.join("Contents/MacOS")).unwrap();
        fs::write(src.join("Contents/Info.plist"), "plist").unwrap();
        fs::write(src.join("Contents/MacOS/firefox"), "bin").unwrap();

        let dst = temp.path().join("dst.app");
        StdFileSystem.copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("Contents/Info.plist")).unwrap(), "plist");
        assert_eq!(fs::read_to_string(dst.join("Contents/MacOS/firefox")).unwrap(), "bin");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_preserves_symlinks() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("real"), "x").unwrap();
        std::os::unix::fs::symlink("real", src.join("link")).unwrap();

        let dst = temp.path().join("dst");
        StdFileSystem.copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_link(dst.join("link")).unwrap(), Path::new("real"));
    }

    #[test]
    fn test_remove_if_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        let dir = temp.path().join("dir");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(dir.join("inner")).unwrap();

        StdFileSystem.remove_if_exists(&file).unwrap();
        StdFileSystem.remove_if_exists(&dir).unwrap();
        StdFileSystem.remove_if_exists(&temp.path().join("missing")).unwrap();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_read_string_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(StdFileSystem.read_string(&temp.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn test_move_item() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("CFNetworkDownload_1.tmp");
        let to = temp.path().join("tor-browser.dmg");
        fs::write(&from, "image").unwrap();

        StdFileSystem.move_item(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "image");
    }
}
