//! Core types shared by every stage of the launcher.
//!
//! - [`error`] - the [`LauncherError`] taxonomy and user-facing [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, LauncherError, user_friendly_error};

/// Result alias used by the pipeline components.
pub type Result<T, E = LauncherError> = std::result::Result<T, E>;
