//! Configuration for the launcher.
//!
//! Two kinds of configuration exist:
//!
//! - [`LauncherPaths`] - where the bundle, the version marker and the settings
//!   live. Built once by the host and injected into every component.
//! - [`Settings`] - user preferences (mirror, proxy) persisted as TOML.

pub mod paths;
pub mod settings;

pub use paths::LauncherPaths;
pub use settings::Settings;
