//! Reading the pipeline inputs from disk.
//!
//! The history export is a JSON array of watch records. The category table
//! is a JSON object (any other JSON value is kept under a `categories` key).
//! The instruction template is plain text.

use std::path::{Path, PathBuf};

use watch_lens_core::{CategoryTaxonomy, WatchRecord};

use crate::error::IntakeError;

/// Paths of the files that make up one analysis request.
#[derive(Debug, Clone)]
pub struct IntakeSources {
    pub history: PathBuf,
    pub taxonomy: Option<PathBuf>,
    pub instructions: Option<PathBuf>,
}

impl IntakeSources {
    pub fn new(history: impl Into<PathBuf>) -> Self {
        Self {
            history: history.into(),
            taxonomy: None,
            instructions: None,
        }
    }

    pub fn taxonomy(mut self, path: Option<PathBuf>) -> Self {
        self.taxonomy = path;
        self
    }

    pub fn instructions(mut self, path: Option<PathBuf>) -> Self {
        self.instructions = path;
        self
    }
}

/// Everything the analysis core consumes from the intake step.
#[derive(Debug, Clone, Default)]
pub struct IntakeBundle {
    pub records: Vec<WatchRecord>,
    pub taxonomy: CategoryTaxonomy,
    /// Instruction template text; `None` means use the built-in default.
    pub instructions: Option<String>,
}

impl IntakeBundle {
    /// Load every source. Missing optional sources yield empty values.
    pub fn load(sources: &IntakeSources) -> Result<Self, IntakeError> {
        log::debug!("Reading watch history from {}", sources.history.display());
        let records = load_history(&sources.history)?;

        let taxonomy = match &sources.taxonomy {
            Some(path) => {
                log::debug!("Reading category taxonomy from {}", path.display());
                load_taxonomy(path)?
            }
            None => CategoryTaxonomy::default(),
        };

        let instructions = match &sources.instructions {
            Some(path) => {
                log::debug!("Reading instruction template from {}", path.display());
                load_instructions(path)?
            }
            None => None,
        };

        Ok(Self {
            records,
            taxonomy,
            instructions,
        })
    }
}

/// Parse a watch-history export.
pub fn load_history(path: &Path) -> Result<Vec<WatchRecord>, IntakeError> {
    let content = std::fs::read_to_string(path).map_err(|e| IntakeError::read(path, e))?;
    parse_history(&content).map_err(|e| IntakeError::parse(path, e))
}

pub fn parse_history(content: &str) -> Result<Vec<WatchRecord>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a category table. A non-object document is wrapped, not rejected.
pub fn load_taxonomy(path: &Path) -> Result<CategoryTaxonomy, IntakeError> {
    let content = std::fs::read_to_string(path).map_err(|e| IntakeError::read(path, e))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| IntakeError::parse(path, e))?;
    Ok(taxonomy_from_value(value))
}

pub fn taxonomy_from_value(value: serde_json::Value) -> CategoryTaxonomy {
    match value {
        serde_json::Value::Object(map) => CategoryTaxonomy(map.into_iter().collect()),
        serde_json::Value::Null => CategoryTaxonomy::default(),
        other => CategoryTaxonomy([("categories".to_string(), other)].into_iter().collect()),
    }
}

/// Read an instruction template. A blank file counts as no template.
pub fn load_instructions(path: &Path) -> Result<Option<String>, IntakeError> {
    let content = std::fs::read_to_string(path).map_err(|e| IntakeError::read(path, e))?;
    if content.trim().is_empty() {
        log::warn!(
            "Instruction template {} is empty; using the built-in default",
            path.display()
        );
        return Ok(None);
    }
    Ok(Some(content))
}

#[cfg(test)]
#[path = "tests/intake_tests.rs"]
mod tests;
