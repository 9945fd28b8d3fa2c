use crate::output::OutputMode;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner animation frames (braille-style dots)
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate progress, hidden in quiet mode
pub fn create_spinner(msg: &str, mode: OutputMode) -> ProgressBar {
    if mode == OutputMode::Quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars(SPINNER_CHARS)
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
