//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

/// Request body: `{"contents":[{"parts":[{"text": ...}]}]}`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct RequestContent<'a> {
    pub parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct RequestPart<'a> {
    pub text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        }
    }
}

/// Response envelope. Every level is optional so a partial envelope still
/// deserializes and can be reported precisely.
#[derive(Debug, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    ///
    /// Returns a description of the first missing level on failure.
    pub fn first_text(&self) -> Result<&str, String> {
        let candidate = self
            .candidates
            .as_deref()
            .ok_or("missing candidates")?
            .first()
            .ok_or("empty candidates")?;
        let parts = candidate
            .content
            .as_ref()
            .ok_or("candidate has no content")?
            .parts
            .as_deref()
            .ok_or("content has no parts")?;
        parts
            .first()
            .ok_or("empty parts")?
            .text
            .as_deref()
            .ok_or_else(|| "first part has no text".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_expected_shape() {
        let json = serde_json::to_value(GenerateRequest::from_prompt("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn first_text_walks_envelope() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"hello"},{"text":"ignored"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.first_text(), Ok("hello"));
    }

    #[test]
    fn first_text_reports_missing_level() {
        let cases = [
            (r#"{}"#, "missing candidates"),
            (r#"{"candidates":[]}"#, "empty candidates"),
            (r#"{"candidates":[{}]}"#, "candidate has no content"),
            (r#"{"candidates":[{"content":{}}]}"#, "content has no parts"),
            (r#"{"candidates":[{"content":{"parts":[]}}]}"#, "empty parts"),
            (r#"{"candidates":[{"content":{"parts":[{}]}}]}"#, "first part has no text"),
        ];
        for (body, expected) in cases {
            let resp: GenerateResponse = serde_json::from_str(body).unwrap();
            assert_eq!(resp.first_text(), Err(expected.to_string()), "{body}");
        }
    }
}
