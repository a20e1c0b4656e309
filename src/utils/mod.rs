//! Utility modules for the launcher.
//!
//! - [`progress`] - terminal rendering of status and download progress

pub mod progress;

pub use progress::StatusRenderer;
