//! The dashboard schema handed to the renderer.
//!
//! Every field is always present. Arrays are always arrays and numbers are
//! always numbers, so a renderer can consume the value without checks.

use serde::{Deserialize, Serialize};

/// Upper bound of [`CategoryTransition::strength`].
pub const TRANSITION_STRENGTH_MAX: f64 = 10.0;

/// Upper bound of [`PsychologicalPattern::evidence_strength`].
pub const EVIDENCE_STRENGTH_MAX: f64 = 100.0;

/// Final, normalized result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_videos_analyzed: u64,
    pub batch_count: u64,
    pub categories: Vec<CategoryShare>,
    pub format_distribution: FormatDistribution,
    pub dominant_topics: Vec<CategoryShare>,
    pub category_transitions: Vec<CategoryTransition>,
    pub psychological_patterns: Vec<PsychologicalPattern>,
    pub recommendations: Vec<Recommendation>,
    pub key_insights: KeyInsights,
}

/// A named share of the history (used for both categories and topics).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub percentage: f64,
}

/// Short-form vs long-form split, in whole percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDistribution {
    pub short_form: u32,
    pub long_form: u32,
}

/// An observed move from one category to another.
///
/// `strength` lies in `[0, TRANSITION_STRENGTH_MAX]` and `from != to`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTransition {
    pub from: String,
    pub to: String,
    pub strength: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologicalPattern {
    pub title: String,
    pub description: String,
    /// In `[0, EVIDENCE_STRENGTH_MAX]`.
    pub evidence_strength: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsights {
    pub category_insight: String,
    pub format_insight: String,
    pub topic_insight: String,
    pub algorithmic_insight: String,
}

impl DashboardData {
    /// All-defaults dashboard: zero counts, empty arrays, empty insights.
    pub fn empty(total_videos: u64) -> Self {
        Self {
            total_videos_analyzed: total_videos,
            ..Self::default()
        }
    }

    /// Payload substituted for a remote call that could not be completed.
    pub fn api_failure() -> Self {
        Self {
            key_insights: KeyInsights {
                category_insight: "Failed to analyze categories due to API error.".to_string(),
                format_insight: "Failed to analyze formats due to API error.".to_string(),
                topic_insight: "Failed to analyze topics due to API error.".to_string(),
                algorithmic_insight: "Failed to analyze algorithm patterns due to API error."
                    .to_string(),
            },
            ..Self::default()
        }
    }

    /// True when nothing beyond the video count was filled in.
    pub fn is_blank(&self) -> bool {
        self.batch_count == 0
            && self.categories.is_empty()
            && self.format_distribution == FormatDistribution::default()
            && self.dominant_topics.is_empty()
            && self.category_transitions.is_empty()
            && self.psychological_patterns.is_empty()
            && self.recommendations.is_empty()
    }
}
