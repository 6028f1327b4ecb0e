//! Recovery of a JSON value from free-form model output.
//!
//! Strategies run in a fixed order and the first value that parses wins.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::ExtractError;
use crate::repair::repair_json;

/// Which step produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    /// Text wrapped in a markdown code fence, body parsed as-is.
    Fenced,
    /// Whole text parsed as-is.
    Direct,
    /// Parsed after [`repair_json`].
    Repaired,
    /// Span from the first opening to the last closing bracket.
    Substring,
    /// Body of a code fence found inside surrounding prose.
    FenceBlock,
    /// Parsed after regex rewrites of common mistakes.
    PatternFix,
}

impl fmt::Display for ExtractStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fenced => "fenced",
            Self::Direct => "direct",
            Self::Repaired => "repaired",
            Self::Substring => "substring",
            Self::FenceBlock => "fence block",
            Self::PatternFix => "pattern fix",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    pub strategy: ExtractStrategy,
}

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#)
        .expect("Built-in regex pattern should always compile")
});

static BARE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":\s*([^"{}\[\],\s]+)(\s*[,}\]])"#)
        .expect("Built-in regex pattern should always compile")
});

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*([}\]])").expect("Built-in regex pattern should always compile")
});

/// Recover a JSON value from `text`.
///
/// When the whole text is wrapped in a code fence only the fence body is
/// considered. Tries, in order: a direct parse, the repaired text, the
/// outermost bracketed span (direct, then repaired), the first fence block
/// inside surrounding prose, and finally regex pattern fixes. Each failed
/// step is listed in the error.
pub fn extract_json(text: &str) -> Result<Extracted, ExtractError> {
    let mut attempts = Vec::new();

    let cleaned = strip_control_chars(text);
    let whole = cleaned.trim();
    let (body, direct) = match strip_fence(whole) {
        Some(inner) => (inner, ExtractStrategy::Fenced),
        None => (whole, ExtractStrategy::Direct),
    };

    match serde_json::from_str::<Value>(body) {
        Ok(value) => return Ok(found(value, direct)),
        Err(e) => attempts.push(format!("{direct}: {e}")),
    }

    match try_repaired(body) {
        Ok(value) => return Ok(found(value, ExtractStrategy::Repaired)),
        Err(reason) => attempts.push(format!("repaired: {reason}")),
    }

    let span = bracketed_span(body);
    match span {
        Some(span) if span.len() < body.len() => {
            match serde_json::from_str::<Value>(span).or_else(|_| try_repaired(span)) {
                Ok(value) => return Ok(found(value, ExtractStrategy::Substring)),
                Err(reason) => attempts.push(format!("substring: {reason}")),
            }
        }
        Some(_) => attempts.push("substring: span is the whole text".to_string()),
        None => attempts.push("substring: no bracketed span".to_string()),
    }

    let inner_block = match direct {
        ExtractStrategy::Direct => first_fence_block(whole),
        _ => None,
    };
    if let Some(block) = inner_block {
        match serde_json::from_str::<Value>(block).or_else(|_| try_repaired(block)) {
            Ok(value) => return Ok(found(value, ExtractStrategy::FenceBlock)),
            Err(reason) => attempts.push(format!("fence block: {reason}")),
        }
    }

    let fixed = pattern_fix(span.unwrap_or(body));
    match serde_json::from_str::<Value>(&fixed) {
        Ok(value) => return Ok(found(value, ExtractStrategy::PatternFix)),
        Err(e) => attempts.push(format!("pattern fix: {e}")),
    }

    log::debug!("JSON extraction failed: {}", attempts.join("; "));
    Err(ExtractError::Exhausted { attempts })
}

fn found(value: Value, strategy: ExtractStrategy) -> Extracted {
    if strategy != ExtractStrategy::Direct && strategy != ExtractStrategy::Fenced {
        log::info!("Recovered model output using the {strategy} strategy");
    }
    Extracted { value, strategy }
}

fn try_repaired(text: &str) -> Result<Value, String> {
    let repaired = repair_json(text).ok_or_else(|| "text does not start with a bracket".to_string())?;
    serde_json::from_str(&repaired).map_err(|e| e.to_string())
}

/// Body of a fence wrapping the whole text, language tag removed.
///
/// Only applies when the trimmed text starts with a fence marker. A missing
/// closing marker is tolerated, so truncated replies still unwrap.
pub fn strip_fence(text: &str) -> Option<&str> {
    let after = text.trim().strip_prefix("```")?;
    let after = after.strip_suffix("```").unwrap_or(after);
    Some(drop_language_tag(after).trim())
}

/// Body of the first code fence anywhere in `text`.
/// An unclosed fence runs to the end of the text.
pub fn first_fence_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let body = drop_language_tag(&text[start + 3..]);
    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    Some(body.trim())
}

fn drop_language_tag(after_marker: &str) -> &str {
    let body_start = after_marker.find('\n').map_or(after_marker.len(), |i| i + 1);
    let tag = after_marker[..body_start].trim();
    if tag.is_empty() || tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        &after_marker[body_start..]
    } else {
        after_marker
    }
}

/// From the first `{` or `[` to the last `}` or `]`.
pub fn bracketed_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let end = text.rfind(['}', ']'])?;
    (end > start).then(|| &text[start..=end])
}

fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Blunt regex rewrites. Unlike [`repair_json`] these ignore string
/// boundaries, so they run last.
fn pattern_fix(text: &str) -> String {
    let fixed = text.replace(['\u{201c}', '\u{201d}'], "\"").replace('\'', "\"");
    let fixed = BARE_KEY.replace_all(&fixed, r#"$1"$2":"#);
    let fixed = BARE_VALUE.replace_all(&fixed, |caps: &Captures| {
        let word = &caps[1];
        if is_json_literal(word) {
            format!(": {word}{}", &caps[2])
        } else {
            format!(": \"{word}\"{}", &caps[2])
        }
    });
    TRAILING_COMMA.replace_all(&fixed, "$1").into_owned()
}

fn is_json_literal(word: &str) -> bool {
    matches!(word, "true" | "false" | "null") || serde_json::from_str::<serde_json::Number>(word).is_ok()
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
