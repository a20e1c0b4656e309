//! Remove the installed bundle, then run the normal flow.

use anyhow::Result;
use clap::Args;

use crate::cli::{CliConfig, CommandContext};

use super::run::RunCommand;
use super::uninstall::uninstall;

#[derive(Debug, Args)]
pub struct ReinstallCommand {
    #[command(flatten)]
    pub run: RunCommand,
}

impl ReinstallCommand {
    pub async fn execute(self, ctx: &CommandContext, config: &CliConfig) -> Result<()> {
        if !self.run.dry_run {
            uninstall(ctx).await?;
        }
        self.run.execute(ctx, config).await
    }
}
