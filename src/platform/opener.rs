//! [`AppOpener`] that hands the bundle to the operating system.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::AppOpener;
use crate::core::{LauncherError, Result};

/// Opens bundles on macOS.
///
/// Goes through `NSWorkspace` with recent items disabled. If Launch Services
/// reports an error, retries once with `/usr/bin/open`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl SystemOpener {
    /// Argument list for the `/usr/bin/open` fallback. A running instance is
    /// reused, since a second browser instance cannot lock the profile.
    pub fn open_args(bundle: &Path, args: &[String]) -> Vec<String> {
        let mut out = vec![bundle.display().to_string()];
        if !args.is_empty() {
            out.push("--args".to_string());
            out.extend(args.iter().cloned());
        }
        out
    }

    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    fn open_with_command(bundle: &Path, args: &[String]) -> Result<()> {
        let open_args = Self::open_args(bundle, args);
        debug!("Running /usr/bin/open {}", open_args.join(" "));

        let status = Command::new("/usr/bin/open").args(&open_args).status().map_err(|e| {
            LauncherError::Launch {
                path: bundle.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(LauncherError::Launch {
                path: bundle.display().to_string(),
                reason: format!("open exited with {status}"),
            })
        }
    }
}

impl AppOpener for SystemOpener {
    #[cfg(target_os = "macos")]
    fn open(&self, bundle: &Path, args: &[String]) -> Result<()> {
        match super::workspace::open_application(bundle, args) {
            Ok(()) => Ok(()),
            Err(reason) => {
                warn!("NSWorkspace could not open {}: {reason}", bundle.display());
                Self::open_with_command(bundle, args)
            }
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn open(&self, bundle: &Path, _args: &[String]) -> Result<()> {
        Err(LauncherError::Launch {
            path: bundle.display().to_string(),
            reason: "opening application bundles is only supported on macOS".to_string(),
        })
    }
}
