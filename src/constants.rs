//! Global constants used throughout the launcher.
//!
//! Remote locations, on-disk names, and the delays the launcher waits before
//! exiting are kept here so they are discoverable in one place.

use std::time::Duration;

/// Default update host. The index is served from here regardless of mirror.
pub const DEFAULT_UPDATE_URL_PREFIX: &str = "https://aus1.torproject.org/torbrowser/";

/// Query string appended to the update prefix so the directory listing is
/// sorted by modification time, newest first.
pub const UPDATE_INDEX_QUERY: &str = "?C=M;O=D";

/// Path of the per-release manifest below a release folder.
pub const DEFAULT_MANIFEST_SUFFIX: &str = "release/download-macos.json";

/// Display name used in status messages for the manifest fetch.
pub const MANIFEST_DISPLAY_NAME: &str = "downloads.json";

/// Pattern identifying a release folder link in the index listing.
pub const UPDATE_PATH_PATTERN: &str = r#"a href="(update_\d+[^"]+).*"#;

/// Basename of the installed application bundle.
pub const APP_BUNDLE_NAME: &str = "Tor Browser.app";

/// Directory created below the platform application-support directory.
pub const APP_SUPPORT_DIR_NAME: &str = "Tor Browser Launcher";

/// Name of the installed version marker file.
pub const VERSION_MARKER_FILE: &str = "version";

/// Name of the persisted settings file.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Identifier of the background transfer.
pub const BACKGROUND_IDENTIFIER: &str = "org.torproject.torbrowser-launcher.background";

/// Default proxy offered in the settings (a local Tor daemon).
pub const DEFAULT_PROXY_ADDRESS: &str = "127.0.0.1:9010";

/// Extended attribute stripped from the installed bundle.
pub const QUARANTINE_ATTRIBUTE: &str = "com.apple.quarantine";

/// How long to keep the final status visible after a terminal failure.
pub const ERROR_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Shorter grace period for failures caused by bad release data.
pub const FAST_ERROR_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Delay between dispatching the open request and exiting.
pub const LAUNCH_QUIT_DELAY: Duration = Duration::from_millis(200);

/// Connect timeout for the HTTP client.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Built-in mirror list. The index is always read from the update host; the
/// mirror is the base the release manifest is resolved against.
pub const MIRRORS: &[&str] = &[
    "https://aus1.torproject.org/torbrowser/",
    "https://dist.torproject.org/torbrowser/",
    "https://tor.calyxinstitute.org/dist/torbrowser/",
    "https://tor.eff.org/dist/torbrowser/",
];
