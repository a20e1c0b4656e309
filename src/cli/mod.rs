//! Command-line interface for the Tor Browser launcher.
//!
//! The binary is a thin host around the update pipeline: it loads the paths
//! and settings, wires the production collaborators, renders status events on
//! the terminal and turns errors into user-facing messages.
//!
//! # Available Commands
//!
//! - `run` - Update Tor Browser if needed, then launch it (the default flow)
//! - `reinstall` - Remove the installed bundle, then run
//! - `uninstall` - Remove the installed bundle and the version marker
//! - `status` - Show where the launcher installs to and what is installed
//! - `settings` - Show or change the mirror and proxy preferences
//!
//! # Usage
//!
//! ```bash
//! # Update if needed and open a page
//! tor-browser-launcher run https://check.torproject.org/
//!
//! # See what would be downloaded without touching the installation
//! tor-browser-launcher run --dry-run
//!
//! # Download through a local Tor daemon
//! tor-browser-launcher settings --proxy 127.0.0.1:9050 --use-proxy true
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Disable the spinner and download bar
//!
//! # Environment Variables
//!
//! - `TBL_INSTALL_ROOT` - Install below this directory instead of the platform
//!   application-support directory
//! - `TBL_NO_PROGRESS` - Same as `--no-progress`
//! - `RUST_LOG` - Log filter when neither `--verbose` nor `--quiet` is given

mod common;
mod reinstall;
mod run;
mod settings;
mod status;
mod uninstall;


pub use common::CommandContext;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Runtime options derived from the global flags.
///
/// Passed explicitly to every command instead of being written to the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level for this crate. `None` defers to `RUST_LOG`, then `warn`.
    pub log_level: Option<String>,

    /// Hide the spinner and download bar.
    pub no_progress: bool,

    /// Print nothing but errors.
    pub quiet: bool,
}

impl CliConfig {
    /// Install the global tracing subscriber. Safe to call more than once.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(format!("tor_browser_launcher={level}")),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tor_browser_launcher=warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Keeps Tor Browser up to date and launches it.
#[derive(Parser, Debug)]
#[command(
    name = "tor-browser-launcher",
    about = "Download, install and launch Tor Browser",
    version,
    long_about = "Finds the current Tor Browser release on the update mirror, installs it \
                  when the installed build is out of date, and launches it."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Shows each pipeline phase, the URLs being fetched and the collaborator
    /// calls made during install.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable the spinner and download progress bar.
    ///
    /// Status messages still reach the log with `--verbose`.
    #[arg(
        long,
        global = true,
        env = "TBL_NO_PROGRESS",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update Tor Browser if a newer build is published, then launch it.
    ///
    /// Extra arguments are passed to Tor Browser, typically URLs to open.
    Run(run::RunCommand),

    /// Remove the installed bundle, then download, install and launch the
    /// current build.
    Reinstall(reinstall::ReinstallCommand),

    /// Remove the installed bundle and forget the installed build.
    Uninstall(uninstall::UninstallCommand),

    /// Show install location, installed build and settings.
    Status(status::StatusCommand),

    /// Show or change mirror and proxy settings.
    Settings(settings::SettingsCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
            quiet: self.quiet,
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let ctx = CommandContext::load().await?;

        match self.command {
            Commands::Run(cmd) => cmd.execute(&ctx, &config).await,
            Commands::Reinstall(cmd) => cmd.execute(&ctx, &config).await,
            Commands::Uninstall(cmd) => cmd.execute(&ctx, &config).await,
            Commands::Status(cmd) => cmd.execute(&ctx, &config),
            Commands::Settings(cmd) => cmd.execute(&ctx, &config).await,
        }
    }
}
