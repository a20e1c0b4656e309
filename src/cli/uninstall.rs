//! Remove the installed bundle and the version marker.
//!
//! Settings are kept. The next `run` downloads and installs the current
//! build from scratch.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cli::{CliConfig, CommandContext};
use crate::status::StatusSender;

#[derive(Debug, Args)]
pub struct UninstallCommand {}

impl UninstallCommand {
    pub async fn execute(self, ctx: &CommandContext, config: &CliConfig) -> Result<()> {
        uninstall(ctx).await?;
        if !config.quiet {
            println!("{} {}", "Removed".green(), ctx.paths.bundle_path().display());
        }
        Ok(())
    }
}

/// Run the uninstall on the blocking pool.
pub(crate) async fn uninstall(ctx: &CommandContext) -> Result<()> {
    let installer = ctx.installer(StatusSender::disconnected())?;
    tokio::task::spawn_blocking(move || installer.uninstall()).await??;
    Ok(())
}
