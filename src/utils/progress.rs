//! Terminal rendering of the status channel.
//!
//! [`StatusRenderer`] is the single consumer of a
//! [`StatusReceiver`](crate::status::StatusReceiver) in the CLI. Status messages
//! become the message of a spinner; the first progress event switches the bar
//! to a byte counter with the download style.
//!
//! # Environment Variables
//!
//! - `TBL_NO_PROGRESS`: Set to any value to disable the progress bar. Status
//!   messages are still logged through `tracing`.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

use crate::status::{StatusEvent, StatusReceiver};

/// Checks if progress bars should be disabled.
fn is_progress_disabled() -> bool {
    std::env::var("TBL_NO_PROGRESS").is_ok()
}

/// Draws status messages and download progress on the terminal.
pub struct StatusRenderer {
    bar: IndicatifBar,
    downloading: bool,
}

impl StatusRenderer {
    /// A spinner, or a hidden bar when progress is disabled.
    pub fn new() -> Self {
        if is_progress_disabled() {
            return Self::hidden();
        }

        let bar = IndicatifBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            downloading: false,
        }
    }

    /// A renderer that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: IndicatifBar::hidden(),
            downloading: false,
        }
    }

    /// Apply one event.
    pub fn apply(&mut self, event: &StatusEvent) {
        match event {
            StatusEvent::Status(message) => self.bar.set_message(message.clone()),
            StatusEvent::Progress {
                written,
                expected,
            } => {
                if !self.downloading {
                    self.downloading = true;
                    self.bar.set_style(download_style());
                }
                if let Some(total) = expected {
                    self.bar.set_length(*total);
                }
                self.bar.set_position(*written);
            }
        }
    }

    /// Consume events until every sender is gone, then clear the bar.
    pub async fn run(mut self, mut receiver: StatusReceiver) {
        while let Some(event) = receiver.recv().await {
            self.apply(&event);
        }
        self.bar.finish_and_clear();
    }
}

impl Default for StatusRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{msg}\n[{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}
