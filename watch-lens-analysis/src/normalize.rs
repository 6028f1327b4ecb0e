//! Coercion of untrusted model output into a schema-valid [`DashboardData`].
//!
//! Every field is rebuilt from scratch: arrays come back as arrays, numbers
//! as bounded numbers, and anything unreadable takes its default. The public
//! entry point never fails.

use serde_json::{Map, Value};
use watch_lens_core::{
    CategoryShare, CategoryTransition, DashboardData, EVIDENCE_STRENGTH_MAX, FormatDistribution,
    KeyInsights, PsychologicalPattern, Recommendation, TRANSITION_STRENGTH_MAX,
};

use crate::error::NormalizeError;

/// Counts known to the caller, preferred over what the model reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeContext {
    pub total_videos: Option<u64>,
    pub batch_count: Option<u64>,
}

impl NormalizeContext {
    pub fn with_total_videos(mut self, total: u64) -> Self {
        self.total_videos = Some(total);
        self
    }

    pub fn with_batch_count(mut self, batches: u64) -> Self {
        self.batch_count = Some(batches);
        self
    }
}

/// Build a dashboard from `parsed`, or the all-defaults dashboard when
/// there is nothing usable (`None`, or a value that is not an object).
pub fn normalize(parsed: Option<&Value>, ctx: &NormalizeContext) -> DashboardData {
    let Some(value) = parsed else {
        log::info!("No parsed analysis; using the default dashboard");
        return DashboardData::empty(ctx.total_videos.unwrap_or(0));
    };
    match try_normalize(value, ctx) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Falling back to the default dashboard: {}", e);
            DashboardData::empty(ctx.total_videos.unwrap_or(0))
        }
    }
}

/// Strict variant of [`normalize`] that reports why a value was rejected.
pub fn try_normalize(value: &Value, ctx: &NormalizeContext) -> Result<DashboardData, NormalizeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(kind_of(value)))?;

    Ok(DashboardData {
        total_videos_analyzed: ctx
            .total_videos
            .unwrap_or_else(|| parse_count(obj.get("totalVideosAnalyzed"))),
        batch_count: ctx
            .batch_count
            .unwrap_or_else(|| parse_count(obj.get("batchCount"))),
        categories: shares(obj.get("categories")),
        format_distribution: format_distribution(obj.get("formatDistribution")),
        dominant_topics: shares(obj.get("dominantTopics")),
        category_transitions: transitions(obj.get("categoryTransitions")),
        psychological_patterns: patterns(obj.get("psychologicalPatterns")),
        recommendations: recommendations(obj.get("recommendations")),
        key_insights: key_insights(obj.get("keyInsights")),
    })
}

/// How a field that should be a list actually arrived.
#[derive(Debug, Clone, Copy)]
enum Shape<'a> {
    Missing,
    Scalar(&'a Value),
    List(&'a [Value]),
    Mapping(&'a Map<String, Value>),
}

impl<'a> Shape<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Shape::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => Shape::Missing,
            Some(Value::Array(items)) => Shape::List(items),
            Some(Value::Object(map)) => Shape::Mapping(map),
            Some(other) => Shape::Scalar(other),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Lenient numeric read: numbers as-is, strings by their leading numeric
/// prefix (`"40%"` is 40), everything else 0.
pub fn parse_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => leading_float(s),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

fn leading_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

fn parse_count(value: Option<&Value>) -> u64 {
    let n = parse_number(value);
    if n > 0.0 { n.round() as u64 } else { 0 }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
        .map(|v| text_of(Some(v)))
        .unwrap_or_default()
}

fn round_to_tenth(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

/// Categories and topics. A mapping with a `name` or `percentage` key is
/// one entry; any other mapping is read as `name -> percentage`.
fn shares(value: Option<&Value>) -> Vec<CategoryShare> {
    let share = |item: &Value| match item {
        Value::Object(obj) => Some(CategoryShare {
            name: string_field(obj, &["name", "category", "topic"]),
            percentage: parse_number(obj.get("percentage")),
        }),
        Value::Null => None,
        other => Some(CategoryShare {
            name: text_of(Some(other)),
            percentage: 0.0,
        }),
    };

    match Shape::of(value) {
        Shape::Missing => Vec::new(),
        Shape::Scalar(v) => share(v).into_iter().collect(),
        Shape::List(items) => items.iter().filter_map(share).collect(),
        Shape::Mapping(map) if map.contains_key("name") || map.contains_key("percentage") => {
            value.and_then(share).into_iter().collect()
        }
        Shape::Mapping(map) => map
            .iter()
            .map(|(name, pct)| CategoryShare {
                name: name.clone(),
                percentage: parse_number(Some(pct)),
            })
            .collect(),
    }
}

/// Fractions (`<= 1`) become percentages; both sides are whole numbers in
/// `[0, 100]`.
fn format_distribution(value: Option<&Value>) -> FormatDistribution {
    let Some(Value::Object(obj)) = value else {
        return FormatDistribution::default();
    };
    let percent = |key: &str| {
        let mut n = parse_number(obj.get(key));
        if n <= 1.0 {
            n *= 100.0;
        }
        n.round().clamp(0.0, 100.0) as u32
    };
    FormatDistribution {
        short_form: percent("shortForm"),
        long_form: percent("longForm"),
    }
}

/// Bring a reported transition strength onto the `0..=10` scale.
///
/// Values up to 1 are fractions of the scale, values above it are on a
/// 0-100 scale; the result is clamped and rounded to one decimal.
pub fn scale_strength(raw: f64) -> f64 {
    let scaled = if raw <= 1.0 {
        raw * TRANSITION_STRENGTH_MAX
    } else if raw > TRANSITION_STRENGTH_MAX {
        raw / 10.0
    } else {
        raw
    };
    round_to_tenth(scaled.clamp(0.0, TRANSITION_STRENGTH_MAX))
}

fn transitions(value: Option<&Value>) -> Vec<CategoryTransition> {
    let items: Vec<&Value> = match Shape::of(value) {
        Shape::List(items) => items.iter().collect(),
        Shape::Mapping(_) => value.into_iter().collect(),
        Shape::Missing | Shape::Scalar(_) => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            let from = string_field(obj, &["from"]);
            let to = string_field(obj, &["to"]);
            if from == to {
                return None;
            }
            Some(CategoryTransition {
                from,
                to,
                strength: scale_strength(parse_number(obj.get("strength"))),
                description: string_field(obj, &["description"]),
            })
        })
        .collect()
}

fn pattern_from(obj: &Map<String, Value>, fallback_title: &str) -> PsychologicalPattern {
    let title = string_field(obj, &["title", "name"]);
    PsychologicalPattern {
        title: if title.is_empty() {
            fallback_title.to_string()
        } else {
            title
        },
        description: string_field(obj, &["description", "text"]),
        evidence_strength: parse_number(obj.get("evidenceStrength")),
    }
}

/// Patterns with evidence strengths rescaled so the largest is at most 100,
/// then each clamped into `[0, 100]`.
fn patterns(value: Option<&Value>) -> Vec<PsychologicalPattern> {
    let mut out: Vec<PsychologicalPattern> = match Shape::of(value) {
        Shape::Missing => Vec::new(),
        Shape::Scalar(v) => vec![PsychologicalPattern {
            description: text_of(Some(v)),
            ..Default::default()
        }],
        Shape::List(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(pattern_from(obj, "")),
                Value::Null => None,
                other => Some(PsychologicalPattern {
                    description: text_of(Some(other)),
                    ..Default::default()
                }),
            })
            .collect(),
        Shape::Mapping(map) if map.contains_key("title") || map.contains_key("description") => {
            vec![pattern_from(map, "")]
        }
        Shape::Mapping(map) => map
            .iter()
            .map(|(key, v)| match v {
                Value::Object(obj) => pattern_from(obj, key),
                other => PsychologicalPattern {
                    title: key.clone(),
                    description: text_of(Some(other)),
                    evidence_strength: 0.0,
                },
            })
            .collect(),
    };

    let max = out
        .iter()
        .map(|p| p.evidence_strength)
        .fold(0.0_f64, f64::max);
    if max > EVIDENCE_STRENGTH_MAX {
        for p in &mut out {
            p.evidence_strength = (p.evidence_strength / max * EVIDENCE_STRENGTH_MAX).round();
        }
    }
    for p in &mut out {
        p.evidence_strength = p.evidence_strength.clamp(0.0, EVIDENCE_STRENGTH_MAX);
    }
    out
}

/// Recommendations. List entries keep a numeric `id` when they carry one;
/// mapping entries are numbered 1, 2, ... in mapping order.
fn recommendations(value: Option<&Value>) -> Vec<Recommendation> {
    match Shape::of(value) {
        Shape::Missing => Vec::new(),
        Shape::Scalar(v) => vec![Recommendation {
            id: 1,
            text: text_of(Some(v)),
        }],
        Shape::List(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .enumerate()
            .map(|(i, item)| {
                let position = i as u64 + 1;
                match item {
                    Value::Object(obj) => Recommendation {
                        id: match parse_count(obj.get("id")) {
                            0 => position,
                            id => id,
                        },
                        text: string_field(obj, &["text", "recommendation", "description"]),
                    },
                    other => Recommendation {
                        id: position,
                        text: text_of(Some(other)),
                    },
                }
            })
            .collect(),
        Shape::Mapping(map) if map.contains_key("text") => vec![Recommendation {
            id: 1,
            text: string_field(map, &["text"]),
        }],
        Shape::Mapping(map) => map
            .values()
            .enumerate()
            .map(|(i, v)| Recommendation {
                id: i as u64 + 1,
                text: text_of(Some(v)),
            })
            .collect(),
    }
}

fn key_insights(value: Option<&Value>) -> KeyInsights {
    let field = |key: &str| {
        value
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    KeyInsights {
        category_insight: field("categoryInsight"),
        format_insight: field("formatInsight"),
        topic_insight: field("topicInsight"),
        algorithmic_insight: field("algorithmicInsight"),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
