//! Integration test suite for the launcher
//!
//! End-to-end tests of the update flow against in-memory collaborators, and
//! of the command-line binary against a mirror served from `file://` URLs.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **downloader**: Fresh install and already-installed flows, resolution failures
//! - **installer**: Version marker and install steps against the real file system
//! - **cli**: The binary's `status`, `settings`, `uninstall` and `run --dry-run`

mod cli;
mod downloader;
mod installer;

use std::path::Path;

/// Index page whose first release folder is `update_9z`.
pub const INDEX_HTML: &str = "<html>\n<a href=\"?C=N;O=A\">Name</a>\n<a href=\"update_9z/\">update_9z/</a>\n<a href=\"update_9/\">update_9/</a>\n</html>\n";

/// Disk image name every fixture resolves to.
pub const BASENAME: &str = "tor-browser-macos-14.5.6.dmg";

/// A release manifest pointing at `binary`.
pub fn manifest(binary: &str) -> String {
    format!(r#"{{"version":"14.5.6","binary":"{binary}"}}"#)
}

/// Lay out a mirror below `root`: `index.html` and
/// `mirror/update_9z/release/download-macos.json`.
pub fn write_file_mirror(root: &Path, binary: &str) {
    std::fs::write(root.join("index.html"), INDEX_HTML).unwrap();
    let release = root.join("mirror").join("update_9z").join("release");
    std::fs::create_dir_all(&release).unwrap();
    std::fs::write(release.join("download-macos.json"), manifest(binary)).unwrap();
}
