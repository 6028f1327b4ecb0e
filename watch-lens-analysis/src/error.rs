use watch_lens_lib::IntakeError;

/// Errors that can occur while talking to the generative-text service or
/// assembling an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response structure: {0}")]
    Envelope(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Batch result out of order: expected batch {expected}, got {got}")]
    OutOfOrder { expected: usize, got: usize },

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Core(#[from] watch_lens_core::CoreError),
}

impl AnalysisError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn envelope(msg: impl Into<String>) -> Self {
        Self::Envelope(msg.into())
    }

    /// Transport-level failures: the request never produced a usable reply.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// Model output from which no JSON value could be recovered.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON value found in model output ({} strategies failed)", .attempts.len())]
    Exhausted { attempts: Vec<String> },
}

/// Parsed model output that cannot be read as a dashboard at all.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("expected a JSON object at the top level, got {0}")]
    NotAnObject(&'static str),
}
