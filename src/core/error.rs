//! Error handling for the launcher
//!
//! This module provides the error taxonomy of the update-and-install pipeline and
//! the user-facing error reporting used by the CLI. The design follows two rules:
//! 1. **Strongly-typed errors** so the orchestrator can decide how long to keep
//!    the final message visible and tests can match on the failure kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Network**: [`LauncherError::Transport`], [`LauncherError::BadStatus`]
//! - **Release data**: [`LauncherError::Decode`], [`LauncherError::NoUpdatePath`],
//!   [`LauncherError::NoBinaryUrl`], [`LauncherError::InvalidBinaryUrl`]
//! - **Installation**: [`LauncherError::FileSystem`], [`LauncherError::AlreadyMounted`],
//!   [`LauncherError::ArchiveMissing`], [`LauncherError::Launch`]
//! - **Host**: [`LauncherError::Config`], [`LauncherError::Cancelled`]
//!
//! Every error is terminal for the current run. Nothing is retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tor_browser_launcher::core::{LauncherError, user_friendly_error};
//!
//! let error = LauncherError::NoUpdatePath;
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{ERROR_GRACE_PERIOD, FAST_ERROR_GRACE_PERIOD};

/// The error type for every stage of the update-and-install pipeline.
///
/// Variants carry owned strings rather than source errors so the type is
/// `Clone` and can be handed both to an error hook and to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LauncherError {
    /// Network, DNS or TLS failure while talking to the mirror.
    #[error("Failed to fetch {url}: {reason}")]
    Transport {
        /// URL being fetched
        url: String,
        /// Underlying transport error
        reason: String,
    },

    /// The server answered with a status outside 200-299.
    #[error("Request for {url} failed (status code: {status}). Cannot continue.")]
    BadStatus {
        /// URL being fetched
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A body could not be decoded (invalid UTF-8 or malformed JSON).
    #[error("Failed to decode {what}: {reason}")]
    Decode {
        /// What was being decoded
        what: String,
        /// Decoder message
        reason: String,
    },

    /// No line of the index matched the release path pattern.
    #[error("Failed to find update path in HTML.")]
    NoUpdatePath,

    /// The release manifest carries no binary for this platform.
    #[error("No binary URL found in downloads.json. Cannot continue.")]
    NoBinaryUrl,

    /// The manifest's binary field is not a usable URL.
    #[error("Invalid binary URL. Cannot continue.")]
    InvalidBinaryUrl {
        /// The rejected value
        url: String,
    },

    /// A mount, copy, move, write or remove failed.
    #[error("File system error: {operation} ({path}): {reason}")]
    FileSystem {
        /// Operation that failed
        operation: String,
        /// Path involved
        path: String,
        /// Underlying error message
        reason: String,
    },

    /// A disk image is already attached by this process.
    #[error("A disk image is already mounted at {mount_point}")]
    AlreadyMounted {
        /// Current mount point
        mount_point: String,
    },

    /// The disk image to attach does not exist.
    #[error("Disk image does not exist: {path}")]
    ArchiveMissing {
        /// Missing image path
        path: String,
    },

    /// The application could not be opened.
    #[error("Failed to launch {path}: {reason}")]
    Launch {
        /// Bundle path
        path: String,
        /// Underlying error message
        reason: String,
    },

    /// Settings or path configuration problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// The run was cancelled by the user.
    #[error("Cancelled")]
    Cancelled,
}

impl LauncherError {
    /// Build a [`LauncherError::FileSystem`] from an I/O error.
    pub fn fs(operation: &str, path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        Self::FileSystem {
            operation: operation.to_string(),
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// How long the final status should stay visible before the process exits.
    ///
    /// Failures caused by bad release data exit faster than network and
    /// install failures. Cancellation exits immediately.
    #[must_use]
    pub fn exit_grace_period(&self) -> Duration {
        match self {
            Self::InvalidBinaryUrl { .. } | Self::Decode { .. } | Self::NoBinaryUrl => {
                FAST_ERROR_GRACE_PERIOD
            }
            Self::Cancelled => Duration::ZERO,
            _ => ERROR_GRACE_PERIOD,
        }
    }
}

/// Error wrapper that adds a suggestion and details for display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LauncherError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: LauncherError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// [`LauncherError`]s anywhere in the chain get tailored suggestions. I/O
/// errors are mapped to [`LauncherError::FileSystem`]. Anything else is shown
/// with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(launcher_error) = error.chain().find_map(|e| e.downcast_ref::<LauncherError>()) {
        return create_error_context(launcher_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let context = ErrorContext::new(LauncherError::FileSystem {
            operation: "file access".to_string(),
            path: "unknown".to_string(),
            reason: io_error.to_string(),
        });
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => context
                .with_suggestion("Check ownership of the application support directory"),
            std::io::ErrorKind::NotFound => context
                .with_suggestion("Check that the file or directory exists and the path is correct"),
            _ => context,
        };
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LauncherError::Config {
        message,
    })
}

fn create_error_context(error: LauncherError) -> ErrorContext {
    match &error {
        LauncherError::Transport { .. } => ErrorContext::new(error)
            .with_suggestion("Check your internet connection, or enable the proxy with 'tor-browser-launcher settings --use-proxy true'")
            .with_details("The update index or release manifest could not be reached"),

        LauncherError::BadStatus { url, .. } => {
            let details = format!("The server rejected the request for {url}");
            ErrorContext::new(error)
                .with_suggestion("Try a different mirror with 'tor-browser-launcher settings --mirror <N>'")
                .with_details(details)
        }

        LauncherError::NoUpdatePath | LauncherError::Decode { .. } => ErrorContext::new(error)
            .with_suggestion("The update index format may have changed. Try again later")
            .with_details("No release folder could be found in the update index"),

        LauncherError::NoBinaryUrl | LauncherError::InvalidBinaryUrl { .. } => ErrorContext::new(error)
            .with_suggestion("Try a different mirror, or wait for the release to finish publishing")
            .with_details("The release manifest does not point at a downloadable disk image"),

        LauncherError::FileSystem { .. }
        | LauncherError::AlreadyMounted { .. }
        | LauncherError::ArchiveMissing { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'tor-browser-launcher reinstall' to start from a clean installation")
            .with_details("The installation may be incomplete"),

        LauncherError::Launch { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'tor-browser-launcher reinstall' if the bundle is damaged"),

        LauncherError::Config { .. } | LauncherError::Cancelled => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grace_periods() {
        assert_eq!(LauncherError::NoBinaryUrl.exit_grace_period(), FAST_ERROR_GRACE_PERIOD);
        assert_eq!(
            LauncherError::InvalidBinaryUrl {
                url: String::new()
            }
            .exit_grace_period(),
            FAST_ERROR_GRACE_PERIOD
        );
        assert_eq!(LauncherError::NoUpdatePath.exit_grace_period(), ERROR_GRACE_PERIOD);
        assert_eq!(LauncherError::Cancelled.exit_grace_period(), Duration::ZERO);
    }

    #[test]
    fn test_bad_status_message_names_url_and_code() {
        let error = LauncherError::BadStatus {
            url: "https://example.com/".to_string(),
            status: 503,
        };
        let message = error.to_string();
        assert!(message.contains("status code: 503"));
        assert!(message.contains("https://example.com/"));
        assert!(!message.contains("update path"));
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_launcher_error() {
        let error = anyhow::Error::from(LauncherError::NoUpdatePath).context("Download failed");
        let context = user_friendly_error(error);
        assert_eq!(context.error, LauncherError::NoUpdatePath);
        assert!(context.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let context = user_friendly_error(error);
        let rendered = context.to_string();
        assert!(rendered.contains("outer"));
        assert!(rendered.contains("root cause"));
    }
}
