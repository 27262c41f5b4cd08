//! Console reporting for the CLI

use crate::events::EventSink;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal as _;
use std::time::Duration;
use tracing::{info, warn};

/// Prints clone events through `tracing`, with a spinner on interactive terminals
pub struct ConsoleSink {
    spinner: ProgressBar,
}

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        let spinner = if std::io::stderr().is_terminal() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            ProgressBar::hidden()
        };

        Self { spinner }
    }

    /// Stop and erase the spinner
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn info(&self, message: &str) {
        self.spinner.set_message(message.to_owned());
        self.spinner.suspend(|| info!("{message}"));
    }

    fn warn(&self, message: &str) {
        self.spinner.suspend(|| warn!("{message}"));
    }
}
