//! watch-lens CLI
//!
//! Command-line interface for analyzing a video watch history.

mod cli_types;
mod commands;
mod error;
mod logging;
mod spinner;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args, cli.quiet),
        Commands::Stats { history, top } => commands::stats::run_stats(&history, top),
        Commands::Normalize {
            raw,
            total,
            batches,
            output,
        } => commands::normalize::run_normalize(&raw, total, batches, output),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Setup => commands::config::run_config_setup(),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    };

    if let Err(e) = result {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}
