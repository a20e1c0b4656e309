//! Tor Browser launcher entry point
//!
//! Parses the command line, runs the selected command and turns failures into
//! a colored message with a suggestion before exiting with status 1.
//!
//! Commands:
//! - `run` - Update Tor Browser if needed, then launch it
//! - `reinstall` - Remove the installed bundle, then run
//! - `uninstall` - Remove the installed bundle
//! - `status` - Show install location and installed build
//! - `settings` - Show or change mirror and proxy settings

use anyhow::Result;
use clap::Parser;
use tor_browser_launcher::cli;
use tor_browser_launcher::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
