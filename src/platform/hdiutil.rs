//! [`DiskImageMounter`] backed by `/usr/bin/hdiutil`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::DiskImageMounter;
use crate::core::{LauncherError, Result};

/// Flags that keep the mounted image out of sight: private, not shown in the
/// Finder, not auto-opened, not verified, read-only.
pub const ATTACH_FLAGS: &[&str] =
    &["-private", "-nobrowse", "-noautoopen", "-noautofsck", "-noverify", "-readonly"];

/// Runs `hdiutil attach` and `hdiutil detach`.
#[derive(Debug, Clone)]
pub struct Hdiutil {
    program: PathBuf,
}

impl Default for Hdiutil {
    fn default() -> Self {
        Self {
            program: PathBuf::from("/usr/bin/hdiutil"),
        }
    }
}

impl Hdiutil {
    /// Argument list for attaching `image` at `mount_point`.
    pub fn attach_args(image: &Path, mount_point: &Path) -> Vec<String> {
        let mut args = vec![
            "attach".to_string(),
            image.display().to_string(),
            "-mountpoint".to_string(),
            mount_point.display().to_string(),
        ];
        args.extend(ATTACH_FLAGS.iter().map(|flag| (*flag).to_string()));
        args
    }

    fn run(&self, args: &[String], operation: &str, path: &Path) -> Result<()> {
        debug!("Running {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| LauncherError::fs(operation, path, e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(LauncherError::FileSystem {
                operation: operation.to_string(),
                path: path.display().to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl DiskImageMounter for Hdiutil {
    fn attach(&self, image: &Path, mount_point: &Path) -> Result<()> {
        self.run(&Self::attach_args(image, mount_point), "attach disk image", image)
    }

    fn detach(&self, mount_point: &Path) -> Result<()> {
        let args = vec!["detach".to_string(), mount_point.display().to_string()];
        self.run(&args, "detach disk image", mount_point)
    }
}
