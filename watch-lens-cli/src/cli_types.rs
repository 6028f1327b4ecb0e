//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use watch_lens_lib::titles::DEFAULT_TOP_N;

#[derive(Parser)]
#[command(name = "watch-lens")]
#[command(about = "Analyze a video watch history with a generative model", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Analyze a watch-history export and write dashboard data
    Analyze(AnalyzeArgs),

    /// Show title statistics for a watch-history export (no API calls)
    Stats {
        /// Watch-history JSON export
        history: PathBuf,

        /// Number of most rewatched titles to list
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Rebuild dashboard data from a saved raw analysis
    Normalize {
        /// Raw analysis file (JSON or free text)
        raw: PathBuf,

        /// Known number of videos analyzed (overrides the file)
        #[arg(long)]
        total: Option<u64>,

        /// Known number of batches (overrides the file)
        #[arg(long)]
        batches: Option<u64>,

        /// Write the dashboard here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage API key and analysis defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Clone)]
pub(crate) struct AnalyzeArgs {
    /// Watch-history JSON export
    pub history: PathBuf,

    /// Instruction template file (default: built-in instructions)
    #[arg(long)]
    pub prompt: Option<PathBuf>,

    /// Category table JSON, substituted for {{categories}} in the template
    #[arg(long)]
    pub categories: Option<PathBuf>,

    /// API key (default: $GEMINI_API_KEY or the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model name (e.g., gemini-2.0-flash)
    #[arg(long)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Records per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory for dashboard-data.json, raw-analysis.json and the log
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Second directory that receives a copy of dashboard-data.json
    #[arg(long)]
    pub mirror_dir: Option<PathBuf>,

    /// Disable the analysis log file
    #[arg(long)]
    pub no_log: bool,

    /// Show the batch plan and title statistics without calling the API
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Interactively set the API key and defaults
    Setup,

    /// Print the config file path
    Path,
}
