//! Spinner shown while a remote call is in flight

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Start a spinner with `message`; hidden when `quiet`
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run `operation` under a spinner, clearing it afterwards
pub fn with_spinner<T>(message: &str, quiet: bool, operation: impl FnOnce() -> T) -> T {
    let pb = spinner(message, quiet);
    let result = operation();
    pb.finish_and_clear();
    result
}
