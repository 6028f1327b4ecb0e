use watch_lens_core::DashboardData;

use crate::config::GeminiSettings;
use crate::error::AnalysisError;
use crate::types::{GenerateRequest, GenerateResponse};

/// Longest slice of an error body kept in errors and logs.
const ERROR_BODY_PREVIEW: usize = 500;

/// A single prompt/response exchange with a generative-text model.
///
/// Implementations may fail; the orchestrator decides how a failure is
/// recorded. [`GeminiClient`] never fails through this trait: it substitutes
/// [`fallback_payload`] instead.
#[allow(async_fn_in_trait)]
pub trait TextModel {
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// JSON text of the all-zero dashboard with "failed to analyze" insights.
///
/// Returned in place of model output when a remote call cannot be completed,
/// so every later stage still receives JSON-shaped text.
pub fn fallback_payload() -> String {
    serde_json::to_string(&DashboardData::api_failure()).unwrap_or_else(|_| "{}".to_string())
}

/// HTTP client for the `generateContent` API.
///
/// One attempt per call, no retries. The per-request timeout from
/// [`GeminiSettings`] applies to the whole exchange.
pub struct GeminiClient {
    http: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    /// Send `prompt` and return the first candidate's text.
    ///
    /// Fails on transport errors, non-success status, an unparsable body or
    /// an envelope missing `candidates[0].content.parts[0].text`.
    pub async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        log::debug!(
            "Sending {} byte prompt to {}",
            prompt.len(),
            self.settings.endpoint()
        );

        let resp = self
            .http
            .post(self.settings.endpoint())
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: preview(&text).to_string(),
            });
        }

        let envelope: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            AnalysisError::envelope(format!(
                "response is not JSON ({e}): {}",
                preview(&text)
            ))
        })?;

        let generated = envelope.first_text().map_err(|what| {
            AnalysisError::envelope(format!("{what}: {}", preview(&text)))
        })?;

        if let Some(reason) = envelope
            .candidates
            .as_deref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|r| *r != "STOP")
        {
            log::warn!("Model stopped early ({reason}); response may be truncated");
        }

        log::debug!("Received {} bytes of generated text", generated.len());
        Ok(generated.to_string())
    }
}

impl TextModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        match self.generate(prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                log::error!("API call failed: {}", e);
                Ok(fallback_payload())
            }
        }
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
