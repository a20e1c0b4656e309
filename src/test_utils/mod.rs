//! Test utilities for the launcher
//!
//! This module provides test doubles for every collaborator of the pipeline
//! and a one-shot logging initialiser for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tor_browser_launcher::test_utils::{CallLog, MockMounter, RecordingFileSystem};
//!
//! let log = CallLog::default();
//! let fs = Arc::new(RecordingFileSystem::new(log.clone()));
//! let mounter = Arc::new(MockMounter::new(log.clone()));
//! // ... build an installer from fs and mounter, run it, then:
//! assert!(log.kinds().is_empty());
//! ```

pub mod mocks;

pub use mocks::{
    Call, CallLog, MockHttpClient, MockMounter, MockOpener, RecordingFileSystem,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither, logging stays off.
///
/// ```bash
/// RUST_LOG=tor_browser_launcher=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
