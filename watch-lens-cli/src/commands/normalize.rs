use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use watch_lens_analysis::{NormalizeContext, extract_json, normalize};
use watch_lens_lib::IntakeError;
use watch_lens_lib::output::write_atomic;

use crate::error::CliError;

/// Run the normalize command: recover and normalize a saved raw analysis.
///
/// Without `--output` the dashboard JSON is the only thing written to stdout.
pub(crate) fn run_normalize(
    raw: &Path,
    total: Option<u64>,
    batches: Option<u64>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let text = std::fs::read_to_string(raw).map_err(|e| IntakeError::read(raw, e))?;
    let ctx = NormalizeContext {
        total_videos: total,
        batch_count: batches,
    };
    let json = dashboard_json(&text, raw, &ctx)?;

    match output {
        Some(path) => {
            write_atomic(&path, &json)?;
            log::info!(
                "{} Dashboard data written to {}",
                "\u{2714}".if_supports_color(Stderr, |t| t.green()),
                path.display().if_supports_color(Stderr, |t| t.cyan()),
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Pretty dashboard JSON for a raw analysis read from `source`.
fn dashboard_json(text: &str, source: &Path, ctx: &NormalizeContext) -> Result<String, CliError> {
    let parsed = match extract_json(text) {
        Ok(extracted) => {
            log::info!(
                "{} Parsed {} ({})",
                "\u{2714}".if_supports_color(Stderr, |t| t.green()),
                source.display(),
                extracted.strategy,
            );
            Some(extracted.value)
        }
        Err(e) => {
            log::warn!(
                "{} {}: {}",
                "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
                source.display(),
                e,
            );
            None
        }
    };

    let dashboard = normalize(parsed.as_ref(), ctx);
    Ok(serde_json::to_string_pretty(&dashboard).map_err(IntakeError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(total: Option<u64>, batches: Option<u64>) -> NormalizeContext {
        NormalizeContext {
            total_videos: total,
            batch_count: batches,
        }
    }

    #[test]
    fn printed_dashboard_is_plain_json() {
        let json = dashboard_json(
            "```json\n{\"batchCount\": 2, \"recommendations\": \"Sleep more\"}\n```",
            Path::new("raw.txt"),
            &ctx(Some(7), None),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalVideosAnalyzed"], 7);
        assert_eq!(value["batchCount"], 2);
        assert_eq!(value["recommendations"][0]["text"], "Sleep more");
    }

    #[test]
    fn unparsable_raw_text_still_prints_defaults() {
        let json = dashboard_json(
            "Error generating final analysis",
            Path::new("raw.txt"),
            &ctx(Some(3), Some(1)),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalVideosAnalyzed"], 3);
        assert_eq!(value["batchCount"], 1);
        assert!(value["categories"].as_array().unwrap().is_empty());
    }
}
