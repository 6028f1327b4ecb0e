//! Test doubles shared by the analysis tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::TextModel;
use crate::error::AnalysisError;

/// Replays canned replies in order and records every prompt it receives.
/// `Err` replies, and any call past the end of the script, fail.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model whose every call fails.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(AnalysisError::envelope(msg)),
            None => Err(AnalysisError::envelope("script exhausted")),
        }
    }
}
