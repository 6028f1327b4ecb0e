use std::path::Path;

use crate::extract::ExtractStrategy;

/// File name of the run log inside the output directory.
pub const LOG_FILE: &str = "analysis-log.txt";

/// A single entry in the analysis log.
#[derive(Debug, Clone)]
pub enum LogEntry {
    BatchOk {
        index: usize,
        total: usize,
        bytes: usize,
    },
    BatchFailed {
        index: usize,
        total: usize,
        reason: String,
    },
    Synthesis {
        bytes: usize,
        error: Option<String>,
    },
    Extraction {
        strategy: Option<ExtractStrategy>,
        attempts: Vec<String>,
    },
    TitleStats {
        total: usize,
        unique: usize,
        rejected: usize,
        top: Vec<(String, usize)>,
    },
}

/// Collects what happened during a run and writes it as a text log.
#[derive(Debug, Default)]
pub struct AnalysisLog {
    entries: Vec<LogEntry>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub batches_ok: usize,
    pub batches_failed: usize,
    pub synthesis_failed: bool,
    pub extracted: bool,
}

impl AnalysisLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn summary(&self) -> LogSummary {
        let mut summary = LogSummary::default();
        for entry in &self.entries {
            match entry {
                LogEntry::BatchOk { .. } => summary.batches_ok += 1,
                LogEntry::BatchFailed { .. } => summary.batches_failed += 1,
                LogEntry::Synthesis { error, .. } => summary.synthesis_failed = error.is_some(),
                LogEntry::Extraction { strategy, .. } => summary.extracted = strategy.is_some(),
                LogEntry::TitleStats { .. } => {}
            }
        }
        summary
    }

    /// Write the log to `path`, replacing any existing file.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::io::Write;

        let mut file = std::fs::File::create(path)?;
        let summary = self.summary();

        writeln!(file, "=== Analysis Log ===")?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(
            file,
            "Batches: {} ok, {} failed",
            summary.batches_ok, summary.batches_failed
        )?;
        writeln!(
            file,
            "Synthesis: {}",
            if summary.synthesis_failed { "failed" } else { "ok" }
        )?;
        writeln!(
            file,
            "Parsed result: {}",
            if summary.extracted { "yes" } else { "no (defaults used)" }
        )?;
        writeln!(file)?;
        writeln!(file, "--- Details ---")?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                LogEntry::BatchOk {
                    index,
                    total,
                    bytes,
                } => {
                    writeln!(file, "[OK] batch {} of {} ({} bytes)", index, total, bytes)?;
                }
                LogEntry::BatchFailed {
                    index,
                    total,
                    reason,
                } => {
                    writeln!(file, "[FAILED] batch {} of {}: {}", index, total, reason)?;
                }
                LogEntry::Synthesis { bytes, error } => match error {
                    None => writeln!(file, "[OK] synthesis ({} bytes)", bytes)?,
                    Some(e) => writeln!(file, "[FAILED] synthesis: {}", e)?,
                },
                LogEntry::Extraction { strategy, attempts } => {
                    match strategy {
                        Some(s) => writeln!(file, "[OK] parsed result ({})", s)?,
                        None => writeln!(file, "[FAILED] no JSON in result")?,
                    }
                    for a in attempts {
                        writeln!(file, "     Attempt: {}", a)?;
                    }
                }
                LogEntry::TitleStats {
                    total,
                    unique,
                    rejected,
                    top,
                } => {
                    writeln!(
                        file,
                        "[TITLES] {} kept, {} unique, {} rejected",
                        total, unique, rejected
                    )?;
                    for (title, count) in top {
                        writeln!(file, "     {}x {}", count, title)?;
                    }
                }
            }
        }

        Ok(())
    }
}
