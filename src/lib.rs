//! Tor Browser Launcher
//!
//! Keeps a local Tor Browser installation current and launches it. On every
//! run the launcher asks the update mirror which release is newest, compares it
//! with the build it installed last time, downloads and installs the disk image
//! when they differ, and finally opens the application.
//!
//! # Architecture Overview
//!
//! ```text
//! Downloader ──> UpdateResolver ──> HttpClient          (index page, release manifest)
//!     │
//!     ├────────> VersionStore ────> FileSystem          (installed-build marker)
//!     ├────────> HttpClient                             (disk image transfer)
//!     ├────────> ArchiveInstaller ─> DiskImageManager ──> DiskImageMounter
//!     │                           └> FileSystem         (replace bundle, strip quarantine)
//!     └────────> AppOpener                              (launch, pass URLs through)
//! ```
//!
//! Every component receives its collaborators and a [`config::LauncherPaths`]
//! at construction, so the whole flow can run against in-memory doubles.
//! Progress is reported as [`status::StatusEvent`]s over a single-consumer
//! channel; the CLI renders them with a spinner.
//!
//! # Core Modules
//!
//! - [`downloader`] - The end-to-end flow, its phases and cancellation
//! - [`resolver`] - Index scraping and release manifest parsing
//! - [`installer`] - Disk image mounting, bundle replacement and launch
//! - [`version`] - The installed-build marker
//! - [`http`] - HTTP access with optional proxy and streamed downloads
//! - [`platform`] - File system, disk image and launcher abstractions
//!
//! # Supporting Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - Install locations and persisted settings
//! - [`constants`] - Mirror URLs, file names and timing
//! - [`core`] - Error types and user-facing error reporting
//! - [`status`] - Status channel between the flow and its host
//! - [`utils`] - Terminal progress rendering
//!
//! # Layout on disk
//!
//! ```text
//! ~/Library/Application Support/Tor Browser Launcher/
//! ├── Tor Browser.app     # installed bundle
//! ├── version             # basename of the installed disk image
//! └── settings.toml       # mirror and proxy preferences
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod downloader;
pub mod http;
pub mod installer;
pub mod platform;
pub mod resolver;
pub mod status;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
