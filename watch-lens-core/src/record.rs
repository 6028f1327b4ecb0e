use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of an exported watch history.
///
/// Only `title` and `name` are interpreted. Every other field of the export
/// (timestamps, URLs, subtitle lists) is carried through untouched so the
/// batches sent upstream contain the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchRecord {
    /// Display title, usually prefixed with "Watched ".
    pub title: String,

    /// Creator/channel name, when the export includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WatchRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            name: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Category lookup table handed over by the intake step.
///
/// The pipeline does not interpret the entries; the table is only spliced
/// into instruction templates that ask for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTaxonomy(pub BTreeMap<String, serde_json::Value>);

impl CategoryTaxonomy {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Compact JSON text of the table, for prompt substitution.
    pub fn to_json_text(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}
