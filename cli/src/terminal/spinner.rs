use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Starts a steady-tick spinner with the given message. The caller clears
/// it once the batch settles.
pub fn start(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap()
        .tick_strings(&["|", "/", "-", "\\"]);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}
