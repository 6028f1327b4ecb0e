use serde::Serialize;

use crate::error::CoreError;
use crate::record::WatchRecord;

/// Records per batch when the caller does not choose a size.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// A contiguous slice of the history, labelled with its 1-based position.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// 1-based position of this batch.
    pub index: usize,
    /// Total number of batches in the run.
    pub total: usize,
    pub records: &'a [WatchRecord],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total
    }

    /// Positional label used in prompts, e.g. "batch 2 of 3".
    pub fn label(&self) -> String {
        format!("batch {} of {}", self.index, self.total)
    }

    /// Pretty JSON of the records in this batch.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.records)
    }
}

/// Summary of how a history will be split, without the records themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    pub total_records: usize,
    pub batch_size: usize,
    pub batch_count: usize,
    /// Size of the final batch (equal to `batch_size` unless the split is uneven).
    pub last_batch_len: usize,
}

impl BatchPlan {
    pub fn new(total_records: usize, batch_size: usize) -> Result<Self, CoreError> {
        if batch_size == 0 {
            return Err(CoreError::InvalidBatchSize(batch_size));
        }
        let batch_count = total_records.div_ceil(batch_size);
        let last_batch_len = match total_records % batch_size {
            0 if total_records > 0 => batch_size,
            rem => rem,
        };
        Ok(Self {
            total_records,
            batch_size,
            batch_count,
            last_batch_len,
        })
    }
}

/// Split `records` into ordered batches of at most `batch_size` entries.
///
/// The batches cover the input exactly once and in order; only the last one
/// may be shorter. An empty history yields no batches.
pub fn partition(records: &[WatchRecord], batch_size: usize) -> Result<Vec<Batch<'_>>, CoreError> {
    let plan = BatchPlan::new(records.len(), batch_size)?;
    Ok(records
        .chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| Batch {
            index: i + 1,
            total: plan.batch_count,
            records: chunk,
        })
        .collect())
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
