//! Show where the launcher installs to and what is installed.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use crate::cli::{CliConfig, CommandContext};
use crate::platform::StdFileSystem;
use crate::version::VersionStore;

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub fn execute(self, ctx: &CommandContext, _config: &CliConfig) -> Result<()> {
        let versions = VersionStore::new(ctx.paths.clone(), Arc::new(StdFileSystem));
        let installed = versions.installed_version()?;

        println!("{} {}", "Install root:".bold(), ctx.paths.install_root().display());
        println!("{} {}", "Bundle:".bold(), ctx.paths.bundle_path().display());
        match installed {
            Some(basename) => println!("{} {}", "Installed:".bold(), basename.green()),
            None => println!("{} {}", "Installed:".bold(), "not installed".yellow()),
        }
        println!("{} {}", "Mirror:".bold(), ctx.settings.mirror());
        match ctx.settings.effective_proxy() {
            Some(proxy) => println!("{} {proxy}", "Proxy:".bold()),
            None => println!("{} none", "Proxy:".bold()),
        }
        Ok(())
    }
}
