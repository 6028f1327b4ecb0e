use thiserror::Error;

/// Errors raised by the deterministic parts of the pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Batches must hold at least one record
    #[error("Invalid batch size: {0} (must be greater than zero)")]
    InvalidBatchSize(usize),
}
