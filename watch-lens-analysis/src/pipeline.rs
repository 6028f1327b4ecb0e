//! One complete analysis run: title statistics, the two-phase model
//! conversation, JSON recovery and schema normalization.

use tokio::sync::mpsc;
use watch_lens_core::{DashboardData, TitleStats, WatchRecord, titles::DEFAULT_TOP_N};
use watch_lens_lib::output::RawAnalysis;

use crate::client::TextModel;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::extract::{Extracted, extract_json};
use crate::log::{AnalysisLog, LogEntry};
use crate::normalize::{NormalizeContext, normalize};
use crate::orchestrator::{AnalysisEvent, BatchLedger, run_conversation};

/// Everything a run produced.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Schema-valid dashboard, always present.
    pub dashboard: DashboardData,
    /// Synthesis text exactly as returned (or its failure text).
    pub raw_analysis: String,
    /// The JSON recovered from `raw_analysis`, if any.
    pub extracted: Option<Extracted>,
    pub title_stats: TitleStats,
    pub ledger: BatchLedger,
    pub log: AnalysisLog,
}

impl AnalysisOutcome {
    /// Raw result in the form it should be archived: pretty JSON when it
    /// could be parsed, verbatim text otherwise.
    pub fn raw_for_archive(&self) -> RawAnalysis<'_> {
        match &self.extracted {
            Some(extracted) => RawAnalysis::Parsed(&extracted.value),
            None => RawAnalysis::Text(&self.raw_analysis),
        }
    }
}

/// Analyze `records` end to end.
///
/// Model failures of any kind are absorbed; the dashboard degrades to
/// defaults instead. Only an invalid batch size (or unserializable records)
/// is reported as an error.
pub async fn analyze_history<M: TextModel>(
    model: &M,
    records: &[WatchRecord],
    config: &AnalysisConfig,
    events: &mpsc::UnboundedSender<AnalysisEvent>,
) -> Result<AnalysisOutcome, AnalysisError> {
    let mut log = AnalysisLog::new();

    let title_stats = TitleStats::from_records(records);
    let top: Vec<(String, usize)> = title_stats
        .top_rewatched(DEFAULT_TOP_N)
        .into_iter()
        .map(|(t, n)| (t.to_string(), n))
        .collect();
    log::info!(
        "Titles: {} kept, {} unique, {} rejected",
        title_stats.total(),
        title_stats.unique(),
        title_stats.rejected()
    );
    for (title, count) in &top {
        log::info!("  {}x {}", count, title);
    }
    log.add(LogEntry::TitleStats {
        total: title_stats.total(),
        unique: title_stats.unique(),
        rejected: title_stats.rejected(),
        top,
    });

    let conversation = run_conversation(model, records, config, events).await?;
    for entry in conversation.ledger.entries() {
        log.add(match &entry.error {
            None => LogEntry::BatchOk {
                index: entry.index,
                total: conversation.ledger.len(),
                bytes: entry.text.len(),
            },
            Some(reason) => LogEntry::BatchFailed {
                index: entry.index,
                total: conversation.ledger.len(),
                reason: reason.clone(),
            },
        });
    }
    log.add(LogEntry::Synthesis {
        bytes: conversation.raw_analysis.len(),
        error: conversation.synthesis_error.clone(),
    });

    let extracted = match extract_json(&conversation.raw_analysis) {
        Ok(extracted) => {
            log.add(LogEntry::Extraction {
                strategy: Some(extracted.strategy),
                attempts: Vec::new(),
            });
            Some(extracted)
        }
        Err(e) => {
            log::warn!("Could not parse the final analysis: {}", e);
            let crate::error::ExtractError::Exhausted { attempts } = e;
            log.add(LogEntry::Extraction {
                strategy: None,
                attempts,
            });
            None
        }
    };

    let ctx = NormalizeContext::default().with_total_videos(records.len() as u64);
    let dashboard = normalize(extracted.as_ref().map(|e| &e.value), &ctx);

    Ok(AnalysisOutcome {
        dashboard,
        raw_analysis: conversation.raw_analysis,
        extracted,
        title_stats,
        ledger: conversation.ledger,
        log,
    })
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
