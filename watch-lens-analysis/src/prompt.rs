//! Prompt text sent to the model.

use watch_lens_core::{Batch, CategoryTaxonomy};

/// Placeholder in an instruction template that is replaced by the category
/// table's JSON text.
pub const CATEGORIES_PLACEHOLDER: &str = "{{categories}}";

/// Schema description appended to every prompt.
pub const SCHEMA_DESCRIPTION: &str = r#"{
  "totalVideosAnalyzed": <integer>,
  "batchCount": <integer>,
  "categories": [{"name": <string>, "percentage": <number 0-100>}],
  "formatDistribution": {"shortForm": <number 0-100>, "longForm": <number 0-100>},
  "dominantTopics": [{"name": <string>, "percentage": <number 0-100>}],
  "categoryTransitions": [{"from": <string>, "to": <string>, "strength": <number 0-10>, "description": <string>}],
  "psychologicalPatterns": [{"title": <string>, "description": <string>, "evidenceStrength": <number 0-100>}],
  "recommendations": [{"id": <integer>, "text": <string>}],
  "keyInsights": {"categoryInsight": <string>, "formatInsight": <string>, "topicInsight": <string>, "algorithmicInsight": <string>}
}"#;

/// Built-in instruction preamble, used when the caller supplies none.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are an analyst studying a person's video watch history. Each record has a \
title (prefixed with \"Watched \") and may include the channel name and the time \
it was watched.

Identify the content categories the person watches and their share of the \
history, the balance between short-form and long-form content, the dominant \
topics, notable transitions from one category to another, behavioural or \
psychological patterns suggested by the viewing habits (with an evidence \
strength for each), and concrete recommendations for a healthier or more \
intentional viewing diet. Summarize the key insights about categories, \
formats, topics and the influence of recommendation algorithms.

Known categories: {{categories}}";

const BATCH_REPLY_RULES: &str = "\
Reply with valid JSON only, matching this schema exactly:";

const SYNTHESIS_REPLY_RULES: &str = "\
Return ONLY a single JSON object that can be parsed directly: no markdown \
fences, no commentary before or after it. Use exactly this schema:";

/// Resolve the instruction template against the category table.
///
/// Templates without the placeholder are returned unchanged. An empty table
/// renders as `{}`.
pub fn render_instructions(template: &str, taxonomy: &CategoryTaxonomy) -> String {
    if template.contains(CATEGORIES_PLACEHOLDER) {
        template.replace(CATEGORIES_PLACEHOLDER, &taxonomy.to_json_text())
    } else {
        template.to_string()
    }
}

/// Prompt for one batch of records.
pub fn batch_prompt(instructions: &str, batch: &Batch<'_>) -> Result<String, serde_json::Error> {
    Ok(format!(
        "{instructions}\n\nHere is {} from my watch history:\n{}\n\n{BATCH_REPLY_RULES}\n{SCHEMA_DESCRIPTION}",
        batch.label(),
        batch.to_json()?,
    ))
}

/// Heading that introduces one batch result inside the synthesis prompt.
pub fn batch_heading(index: usize) -> String {
    format!("--- BATCH {index} ANALYSIS ---")
}

/// Prompt that asks the model to merge the per-batch results.
///
/// `results` must be in batch order; each is labelled with its 1-based index.
pub fn synthesis_prompt<'a>(
    instructions: &str,
    results: impl IntoIterator<Item = (usize, &'a str)>,
) -> String {
    let mut prompt = format!(
        "{instructions}\n\nI've analyzed my watch history in batches. Here are the insights from each batch:\n\n"
    );
    for (index, result) in results {
        prompt.push_str(&batch_heading(index));
        prompt.push('\n');
        prompt.push_str(result);
        prompt.push_str("\n\n");
    }
    prompt.push_str(
        "\nPlease provide a comprehensive analysis that combines all these batch insights into a cohesive summary.\n\n",
    );
    prompt.push_str(SYNTHESIS_REPLY_RULES);
    prompt.push('\n');
    prompt.push_str(SCHEMA_DESCRIPTION);
    prompt
}
