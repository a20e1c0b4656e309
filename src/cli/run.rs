//! Update Tor Browser if needed, then launch it.
//!
//! This is the launcher's main flow. Status messages are drawn on a spinner
//! while the pipeline runs. When the run fails, the failure stays on screen
//! for a grace period that depends on the kind of error, so a user who started
//! the launcher from a dock or a shortcut can read it before the process exits.
//!
//! # Examples
//!
//! ```bash
//! # Update if needed and launch
//! tor-browser-launcher run
//!
//! # Open pages in the launched browser
//! tor-browser-launcher run https://check.torproject.org/ https://www.torproject.org/
//!
//! # Resolve the current release without downloading or launching
//! tor-browser-launcher run --dry-run
//!
//! # Use the second mirror for this run only
//! tor-browser-launcher run --mirror 1
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{CliConfig, CommandContext};
use crate::core::LauncherError;
use crate::downloader::{Collaborators, DownloadMode, DownloadOutcome, Downloader};
use crate::resolver::parse_url;
use crate::status::StatusSender;
use crate::utils::progress::StatusRenderer;

use super::settings::validate_mirror_index;

/// Arguments of `run` (and of `reinstall`, which flattens them).
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Arguments passed to Tor Browser, typically URLs to open
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Resolve the current release and report what would be downloaded
    #[arg(long)]
    pub dry_run: bool,

    /// Exit immediately on failure instead of keeping the error visible
    #[arg(long)]
    pub no_wait: bool,

    /// Use this mirror for this run instead of the configured one
    #[arg(long, value_name = "INDEX")]
    pub mirror: Option<usize>,

    /// Read the release index from this URL
    #[arg(long, value_name = "URL", hide = true)]
    pub index_url: Option<String>,

    /// Resolve manifests below this URL instead of the selected mirror
    #[arg(long, value_name = "URL", hide = true)]
    pub mirror_url: Option<String>,
}

impl RunCommand {
    /// Execute the flow once.
    pub async fn execute(self, ctx: &CommandContext, config: &CliConfig) -> Result<()> {
        let mut settings = ctx.settings.clone();
        if let Some(index) = self.mirror {
            validate_mirror_index(index)?;
            settings.mirror_index = index;
        }

        let mirror = self.mirror_url.as_deref().unwrap_or_else(|| settings.mirror());
        let mirror_url = parse_url(mirror)?;
        let collaborators = Collaborators::system(settings.effective_proxy())?;
        debug!("Using mirror {mirror_url} (proxy: {:?})", settings.effective_proxy());

        let (status, receiver) = StatusSender::channel();
        let renderer = if config.no_progress {
            StatusRenderer::hidden()
        } else {
            StatusRenderer::new()
        };
        let render_task = tokio::spawn(renderer.run(receiver));

        let mode = if self.dry_run {
            DownloadMode::ScheduleOnly
        } else {
            DownloadMode::Full
        };
        let mut downloader =
            Downloader::new(ctx.paths.clone(), mirror_url, collaborators, status.clone())?
                .with_urls(self.urls)
                .with_mode(mode);
        if let Some(index_url) = &self.index_url {
            downloader = downloader.with_index_url(parse_url(index_url)?);
        }

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let result = downloader.download(&cancel).await;
        interrupt.abort();

        if let Err(error) = &result {
            status.status(error.to_string());
            if !self.no_wait {
                hold_error(error, &cancel).await;
            }
        }

        // The renderer finishes once every sender is gone.
        drop(downloader);
        drop(status);
        let _ = render_task.await;

        let outcome = result?;
        if !config.quiet {
            report(&outcome);
        }
        Ok(())
    }
}

/// Keep the final status visible for the error's grace period. A second
/// interrupt ends the wait early.
async fn hold_error(error: &LauncherError, cancel: &CancellationToken) {
    let grace = error.exit_grace_period();
    if grace.is_zero() {
        return;
    }

    debug!("Keeping error visible for {grace:?}");
    tokio::select! {
        () = tokio::time::sleep(grace) => {}
        () = cancel.cancelled() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

fn report(outcome: &DownloadOutcome) {
    match outcome {
        DownloadOutcome::Launched {
            basename,
        } => {
            println!("{} {basename}", "Launched".green());
        }
        DownloadOutcome::Installed {
            basename,
            bytes,
        } => {
            println!("{} {basename} ({bytes} bytes)", "Installed".green());
        }
        DownloadOutcome::UpToDate {
            basename,
        } => {
            println!("{} is up to date", basename.cyan());
        }
        DownloadOutcome::Scheduled {
            url,
            basename,
        } => {
            println!("{} {basename}", "Would download".yellow());
            println!("  from {url}");
        }
    }
}
