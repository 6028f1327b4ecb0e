//! Progress display for a single analysis run.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// Counted spinner for `steps` model calls; hidden when `quiet`.
pub(crate) fn call_progress(steps: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(steps);
    let style = ProgressStyle::with_template("  {spinner:.cyan} [{pos}/{len}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("/-\\|");
    pb.set_style(style);
    pb.enable_steady_tick(TICK);
    pb
}
