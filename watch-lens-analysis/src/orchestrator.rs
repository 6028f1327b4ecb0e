//! Two-phase conversation with the model: one call per batch, then one
//! synthesis call over every batch result.

use tokio::sync::mpsc;
use watch_lens_core::{WatchRecord, partition};

use crate::client::TextModel;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::prompt;

/// Raw result used when the synthesis call itself fails. Not JSON.
pub const SYNTHESIS_FAILURE_TEXT: &str = "Error generating final analysis";

/// Text recorded in place of a failed batch result.
pub fn batch_failure_text(index: usize) -> String {
    format!("Error: Failed to process batch {index}")
}

/// Progress events emitted during a run, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// The history was split; `batches` calls follow, then synthesis.
    Partitioned { records: usize, batches: usize },
    /// A batch prompt is being sent.
    BatchStarted { index: usize, total: usize, records: usize },
    /// A batch returned text.
    BatchCompleted { index: usize, total: usize, bytes: usize },
    /// A batch call failed; a placeholder was recorded instead.
    BatchFailed { index: usize, total: usize, reason: String },
    SynthesisStarted { batches: usize },
    SynthesisCompleted { bytes: usize },
    SynthesisFailed { reason: String },
    Done,
}

/// One recorded batch result.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// 1-based batch position.
    pub index: usize,
    /// Model text, or the failure placeholder.
    pub text: String,
    /// Why the call failed, when it did.
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Append-only, index-ordered record of phase-one results.
///
/// Entries can only be appended in batch order, so iteration order is the
/// order the batches were cut from the history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchLedger {
    entries: Vec<BatchEntry>,
}

impl BatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next entry must carry.
    pub fn next_index(&self) -> usize {
        self.entries.len() + 1
    }

    fn check_order(&self, index: usize) -> Result<(), AnalysisError> {
        let expected = self.next_index();
        if index != expected {
            return Err(AnalysisError::OutOfOrder {
                expected,
                got: index,
            });
        }
        Ok(())
    }

    pub fn record_success(&mut self, index: usize, text: String) -> Result<(), AnalysisError> {
        self.check_order(index)?;
        self.entries.push(BatchEntry {
            index,
            text,
            error: None,
        });
        Ok(())
    }

    pub fn record_failure(
        &mut self,
        index: usize,
        reason: impl Into<String>,
    ) -> Result<(), AnalysisError> {
        self.check_order(index)?;
        self.entries.push(BatchEntry {
            index,
            text: batch_failure_text(index),
            error: Some(reason.into()),
        });
        Ok(())
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failed()).count()
    }

    /// `(index, text)` pairs in batch order, as embedded in the synthesis prompt.
    pub fn sections(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|e| (e.index, e.text.as_str()))
    }
}

/// Everything the two phases produced.
#[derive(Debug, Clone)]
pub struct ConversationResult {
    pub ledger: BatchLedger,
    /// Synthesis reply, or [`SYNTHESIS_FAILURE_TEXT`].
    pub raw_analysis: String,
    /// Why synthesis failed, when it did.
    pub synthesis_error: Option<String>,
}

impl ConversationResult {
    pub fn synthesis_failed(&self) -> bool {
        self.synthesis_error.is_some()
    }
}

/// Run both phases against `model`, strictly one call at a time.
///
/// Model failures never abort the run: a failed batch is recorded as a
/// placeholder and a failed synthesis yields [`SYNTHESIS_FAILURE_TEXT`].
/// Errors are returned only for an invalid batch size or records that cannot
/// be serialized.
pub async fn run_conversation<M: TextModel>(
    model: &M,
    records: &[WatchRecord],
    config: &AnalysisConfig,
    events: &mpsc::UnboundedSender<AnalysisEvent>,
) -> Result<ConversationResult, AnalysisError> {
    let batches = partition(records, config.batch_size)?;
    let total = batches.len();
    let instructions = prompt::render_instructions(&config.instructions, &config.taxonomy);

    log::info!(
        "Analyzing {} records in {} batch(es) of up to {}",
        records.len(),
        total,
        config.batch_size
    );
    let _ = events.send(AnalysisEvent::Partitioned {
        records: records.len(),
        batches: total,
    });

    let mut ledger = BatchLedger::new();
    for batch in &batches {
        let _ = events.send(AnalysisEvent::BatchStarted {
            index: batch.index,
            total,
            records: batch.len(),
        });
        log::debug!("Sending {} ({} records)", batch.label(), batch.len());

        let prompt = prompt::batch_prompt(&instructions, batch)?;
        match model.complete(&prompt).await {
            Ok(text) => {
                let _ = events.send(AnalysisEvent::BatchCompleted {
                    index: batch.index,
                    total,
                    bytes: text.len(),
                });
                ledger.record_success(batch.index, text)?;
            }
            Err(e) => {
                log::warn!("Batch {} of {} failed: {}", batch.index, total, e);
                let reason = e.to_string();
                let _ = events.send(AnalysisEvent::BatchFailed {
                    index: batch.index,
                    total,
                    reason: reason.clone(),
                });
                ledger.record_failure(batch.index, reason)?;
            }
        }
    }

    let _ = events.send(AnalysisEvent::SynthesisStarted { batches: total });
    let synthesis = prompt::synthesis_prompt(&instructions, ledger.sections());
    let (raw_analysis, synthesis_error) = match model.complete(&synthesis).await {
        Ok(text) => {
            let _ = events.send(AnalysisEvent::SynthesisCompleted { bytes: text.len() });
            (text, None)
        }
        Err(e) => {
            log::error!("Synthesis failed: {}", e);
            let reason = e.to_string();
            let _ = events.send(AnalysisEvent::SynthesisFailed {
                reason: reason.clone(),
            });
            (SYNTHESIS_FAILURE_TEXT.to_string(), Some(reason))
        }
    };

    let _ = events.send(AnalysisEvent::Done);
    Ok(ConversationResult {
        ledger,
        raw_analysis,
        synthesis_error,
    })
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
