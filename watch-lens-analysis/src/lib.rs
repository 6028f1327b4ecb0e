//! Batch analysis of a video watch history through a generative-text model.
//!
//! The history is cut into batches, each batch is analyzed by the model, the
//! batch results are merged in a final synthesis call, and the reply is
//! recovered into a bounded [`DashboardData`](watch_lens_core::DashboardData)
//! no matter how the model or the network misbehaved.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod log;
pub mod normalize;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod repair;
pub mod types;

pub use client::{GeminiClient, TextModel, fallback_payload};
pub use config::{AnalysisConfig, ConfigOverrides, ConfigSource, GeminiSettings, ResolvedConfig};
pub use error::{AnalysisError, ExtractError, NormalizeError};
pub use extract::{ExtractStrategy, Extracted, extract_json};
pub use normalize::{NormalizeContext, normalize};
pub use orchestrator::{AnalysisEvent, BatchLedger};
pub use pipeline::{AnalysisOutcome, analyze_history};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
