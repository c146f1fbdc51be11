use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(120);

fn create_spinner(msg: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = ProgressBar::new_spinner().with_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(TICK);
    pb
}

/// Run `f` under a spinner that is cleared however `f` returns.
pub fn with_spinner<T>(msg: &str, f: impl FnOnce(&ProgressBar) -> T) -> T {
    let spinner = create_spinner(msg);
    let result = f(&spinner);
    spinner.finish_and_clear();
    result
}

/// Byte counter for copying one receipt of `len` bytes.
pub fn create_bytes_progress(len: u64, receipt: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{msg:>24} {wide_bar:.green/dim} {bytes:>9}/{total_bytes:<9} {bytes_per_sec}",
    )
    .map(|s| s.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let pb = ProgressBar::new(len).with_style(style);
    pb.set_message(receipt.to_string());
    pb
}
