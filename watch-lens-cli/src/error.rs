use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Reading inputs or writing outputs failed
    #[error(transparent)]
    Intake(#[from] watch_lens_lib::IntakeError),

    /// Configuration or analysis setup failed
    #[error(transparent)]
    Analysis(#[from] watch_lens_analysis::AnalysisError),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Logger could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}

impl From<watch_lens_lib::CoreError> for CliError {
    fn from(e: watch_lens_lib::CoreError) -> Self {
        Self::Analysis(e.into())
    }
}
