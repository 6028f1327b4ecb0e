use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use watch_lens_analysis::log::LOG_FILE;
use watch_lens_analysis::{
    AnalysisConfig, AnalysisEvent, ConfigOverrides, GeminiClient, ResolvedConfig,
    analyze_history,
};
use watch_lens_lib::async_util::run_with_events;
use watch_lens_lib::output::write_outputs;
use watch_lens_lib::{BatchPlan, IntakeBundle, IntakeSources, OutputTargets};

use crate::cli_types::AnalyzeArgs;
use crate::commands::stats::log_title_stats;
use crate::error::CliError;
use crate::spinner;

/// Run the analyze command.
pub(crate) fn run_analyze(args: AnalyzeArgs, quiet: bool) -> Result<(), CliError> {
    let overrides = ConfigOverrides {
        api_key: args.api_key,
        model: args.model,
        base_url: args.base_url,
        timeout_secs: args.timeout,
        batch_size: args.batch_size,
        output_dir: args.output_dir,
        mirror_dir: args.mirror_dir,
    };
    let resolved = ResolvedConfig::load(&overrides)?;

    let sources = IntakeSources::new(&args.history)
        .taxonomy(args.categories)
        .instructions(args.prompt);
    let bundle = IntakeBundle::load(&sources)?;

    let config = AnalysisConfig::new(bundle.instructions.clone())
        .with_batch_size(resolved.batch_size.value)
        .with_taxonomy(bundle.taxonomy.clone());
    let plan = BatchPlan::new(bundle.records.len(), config.batch_size)?;

    log::info!(
        "Analyzing history: {}",
        args.history.display().if_supports_color(Stderr, |t| t.cyan()),
    );
    log::info!(
        "{}",
        format!(
            "{} records in {} batch(es) of up to {}",
            plan.total_records, plan.batch_count, plan.batch_size
        )
        .if_supports_color(Stderr, |t| t.dimmed()),
    );
    if !bundle.taxonomy.is_empty() {
        log::info!(
            "{}",
            format!("Categories: {} entries", bundle.taxonomy.len())
                .if_supports_color(Stderr, |t| t.dimmed()),
        );
    }
    log::info!(
        "Model:  {} {}",
        resolved.model.value,
        format!("({})", resolved.model.source).if_supports_color(Stderr, |t| t.dimmed()),
    );
    log::info!(
        "Output: {}",
        resolved
            .output_dir
            .value
            .display()
            .if_supports_color(Stderr, |t| t.dimmed()),
    );
    log::info!("");

    if args.dry_run {
        log::info!(
            "{}",
            "Dry run: no API calls will be made".if_supports_color(Stderr, |t| t.dimmed()),
        );
        log_title_stats(
            &watch_lens_lib::TitleStats::from_records(&bundle.records),
            watch_lens_lib::titles::DEFAULT_TOP_N,
        );
        return Ok(());
    }

    let client = GeminiClient::new(resolved.gemini()?)?;
    let rt = tokio::runtime::Runtime::new().map_err(|e| CliError::runtime(e.to_string()))?;

    let outcome = rt.block_on(async {
        let pb = spinner::call_progress(plan.batch_count as u64 + 1, quiet);
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<AnalysisEvent>();

        let analysis = async move {
            analyze_history(&client, &bundle.records, &config, &event_tx).await
        };

        let result = run_with_events(analysis, event_rx, |e| match e {
            AnalysisEvent::Partitioned { .. } => {}
            AnalysisEvent::BatchStarted { index, total, records } => {
                pb.set_message(format!("Analyzing batch {} of {} ({} records)", index, total, records));
            }
            AnalysisEvent::BatchCompleted { .. } => pb.inc(1),
            AnalysisEvent::BatchFailed { index, total, ref reason } => {
                pb.suspend(|| {
                    log::warn!(
                        "  {} Batch {} of {} failed: {}",
                        "\u{2718}".if_supports_color(Stderr, |t| t.red()),
                        index,
                        total,
                        reason,
                    );
                });
                pb.inc(1);
            }
            AnalysisEvent::SynthesisStarted { batches } => {
                pb.set_message(format!("Combining {} batch result(s)", batches));
            }
            AnalysisEvent::SynthesisCompleted { .. } => pb.inc(1),
            AnalysisEvent::SynthesisFailed { ref reason } => {
                pb.suspend(|| {
                    log::warn!(
                        "  {} Final analysis failed: {}",
                        "\u{2718}".if_supports_color(Stderr, |t| t.red()),
                        reason,
                    );
                });
                pb.inc(1);
            }
            AnalysisEvent::Done => {}
        })
        .await;

        pb.finish_and_clear();
        result
    })?;

    let summary = outcome.log.summary();
    if summary.batches_failed == 0 {
        log::info!(
            "{} {} batch(es) analyzed",
            "\u{2714}".if_supports_color(Stderr, |t| t.green()),
            summary.batches_ok,
        );
    } else {
        log::warn!(
            "{} {} of {} batch(es) failed",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            summary.batches_failed,
            summary.batches_ok + summary.batches_failed,
        );
    }
    match &outcome.extracted {
        Some(extracted) => log::info!(
            "{} Final analysis parsed ({})",
            "\u{2714}".if_supports_color(Stderr, |t| t.green()),
            extracted.strategy,
        ),
        None => log::warn!(
            "{} Final analysis could not be parsed; dashboard uses defaults",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
        ),
    }

    let targets = OutputTargets::new(&resolved.output_dir.value)
        .with_mirror(resolved.mirror_dir.as_ref().map(|d| d.value.clone()));
    let written = write_outputs(&targets, &outcome.dashboard, outcome.raw_for_archive())?;

    log::info!(
        "{} Dashboard data written to {}",
        "\u{2714}".if_supports_color(Stderr, |t| t.green()),
        written.dashboard.display().if_supports_color(Stderr, |t| t.cyan()),
    );
    if let Some(mirror) = &written.mirror {
        log::info!(
            "{} Copied to {}",
            "\u{2714}".if_supports_color(Stderr, |t| t.green()),
            mirror.display().if_supports_color(Stderr, |t| t.cyan()),
        );
    }
    log::info!(
        "  Raw analysis: {}",
        written.raw_analysis.display().if_supports_color(Stderr, |t| t.dimmed()),
    );

    if !args.no_log {
        let log_path = targets.output_dir.join(LOG_FILE);
        if let Err(e) = outcome.log.write_to_file(&log_path) {
            log::warn!("Warning: could not write analysis log: {}", e);
        }
    }

    Ok(())
}
