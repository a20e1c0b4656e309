//! Show or change the persisted launcher settings.
//!
//! Without options the current settings are printed. Any option updates the
//! settings file in the install root.
//!
//! ```bash
//! tor-browser-launcher settings
//! tor-browser-launcher settings --mirror 2
//! tor-browser-launcher settings --proxy 127.0.0.1:9050 --use-proxy true
//! tor-browser-launcher settings --reset
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cli::{CliConfig, CommandContext};
use crate::config::Settings;
use crate::constants::MIRRORS;
use crate::core::LauncherError;
use crate::http::parse_proxy;

#[derive(Debug, Args)]
pub struct SettingsCommand {
    /// Select a mirror by its index in the list shown by `settings`
    #[arg(long, value_name = "INDEX")]
    pub mirror: Option<usize>,

    /// Proxy address as host:port
    #[arg(long, value_name = "HOST:PORT")]
    pub proxy: Option<String>,

    /// Route downloads through the proxy
    #[arg(long, value_name = "BOOL")]
    pub use_proxy: Option<bool>,

    /// Restore the default settings
    #[arg(long, conflicts_with_all = ["mirror", "proxy", "use_proxy"])]
    pub reset: bool,
}

impl SettingsCommand {
    fn is_update(&self) -> bool {
        self.reset || self.mirror.is_some() || self.proxy.is_some() || self.use_proxy.is_some()
    }

    /// Apply the requested changes to `settings`.
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        if self.reset {
            *settings = Settings::default();
            return Ok(());
        }

        if let Some(index) = self.mirror {
            validate_mirror_index(index)?;
            settings.mirror_index = index;
        }
        if let Some(proxy) = &self.proxy {
            parse_proxy(proxy)?;
            settings.proxy_address = proxy.clone();
        }
        if let Some(use_proxy) = self.use_proxy {
            settings.use_proxy = use_proxy;
        }
        Ok(())
    }

    pub async fn execute(self, ctx: &CommandContext, config: &CliConfig) -> Result<()> {
        if !self.is_update() {
            print_settings(&ctx.settings);
            return Ok(());
        }

        let mut settings = ctx.settings.clone();
        self.apply(&mut settings)?;
        settings.save_to(&ctx.paths.settings_path()).await?;

        if !config.quiet {
            println!("{}", "Settings saved".green());
            print_settings(&settings);
        }
        Ok(())
    }
}

/// Reject mirror indices outside the known list.
pub(crate) fn validate_mirror_index(index: usize) -> Result<(), LauncherError> {
    if index < MIRRORS.len() {
        Ok(())
    } else {
        Err(LauncherError::Config {
            message: format!(
                "Mirror index {index} is out of range (0-{})",
                MIRRORS.len().saturating_sub(1)
            ),
        })
    }
}

fn print_settings(settings: &Settings) {
    println!("{}", "Mirrors:".bold());
    for (index, mirror) in MIRRORS.iter().enumerate() {
        if index == settings.mirror_index {
            println!("  {} {index}: {mirror}", "*".green());
        } else {
            println!("    {index}: {mirror}");
        }
    }
    println!("{} {}", "Proxy:".bold(), settings.proxy_address);
    println!(
        "{} {}",
        "Use proxy:".bold(),
        if settings.use_proxy { "yes" } else { "no" }
    );
}
