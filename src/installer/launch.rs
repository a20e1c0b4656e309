//! Opening the installed bundle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::core::{LauncherError, Result};
use crate::platform::AppOpener;

/// Open `bundle` with `urls` as arguments, then wait `quit_delay` so the
/// open request is dispatched before the caller exits.
///
/// The opener runs on the blocking pool.
pub async fn launch_and_quit(
    opener: Arc<dyn AppOpener>,
    bundle: PathBuf,
    urls: Vec<String>,
    quit_delay: Duration,
) -> Result<()> {
    info!("Opening {} with {} argument(s)", bundle.display(), urls.len());

    let path = bundle.display().to_string();
    tokio::task::spawn_blocking(move || opener.open(&bundle, &urls))
        .await
        .map_err(|e| LauncherError::Launch {
            path,
            reason: e.to_string(),
        })??;

    tokio::time::sleep(quit_delay).await;
    Ok(())
}
