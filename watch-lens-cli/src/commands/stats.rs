use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use watch_lens_lib::TitleStats;
use watch_lens_lib::intake::load_history;

use crate::error::CliError;

/// Run the stats command.
pub(crate) fn run_stats(history: &Path, top: usize) -> Result<(), CliError> {
    let records = load_history(history)?;
    log::info!(
        "Watch history: {}",
        history.display().if_supports_color(Stderr, |t| t.cyan()),
    );
    log::info!("");
    log_title_stats(&TitleStats::from_records(&records), top);
    Ok(())
}

/// Log counts and the most rewatched titles.
pub(crate) fn log_title_stats(stats: &TitleStats, top: usize) {
    log::info!("{}", "Titles".if_supports_color(Stderr, |t| t.bold()));
    log::info!("  Kept:     {:>8}", stats.total());
    log::info!("  Unique:   {:>8}", stats.unique());
    log::info!("  Rejected: {:>8}", stats.rejected());

    let ranked = stats.top_rewatched(top);
    if ranked.is_empty() {
        log::info!(
            "  {}",
            "No title was watched more than once".if_supports_color(Stderr, |t| t.dimmed()),
        );
        return;
    }
    log::info!("");
    log::info!("{}", "Most rewatched".if_supports_color(Stderr, |t| t.bold()));
    for (title, count) in ranked {
        log::info!(
            "  {} {}",
            format!("{:>4}x", count).if_supports_color(Stderr, |t| t.cyan()),
            title,
        );
    }
}
