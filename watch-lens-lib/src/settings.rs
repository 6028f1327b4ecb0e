//! Location and surgical editing of the shared `config.toml`.
//!
//! The file lives at `~/.config/watch-lens/config.toml` (platform config dir).
//! Reading is forgiving: a missing or malformed file behaves like an empty
//! one. Writing updates single keys so unrelated sections are preserved.

use std::io;
use std::path::{Path, PathBuf};

use crate::output::write_atomic;

/// Directory holding watch-lens configuration, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("watch-lens"))
}

/// Canonical path to the config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Default directory for analysis results: `./output`.
pub fn default_output_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("output")
}

/// Parse a TOML document, treating unreadable or invalid files as absent.
pub fn load_document(path: &Path) -> Option<toml::Table> {
    let contents = std::fs::read_to_string(path).ok()?;
    match contents.parse::<toml::Table>() {
        Ok(table) => Some(table),
        Err(e) => {
            log::warn!("Ignoring malformed config file {}: {}", path.display(), e);
            None
        }
    }
}

/// Look up `[section] key` as a string.
pub fn get_string(doc: &toml::Table, section: &str, key: &str) -> Option<String> {
    let value = doc.get(section)?.get(key)?;
    match value {
        toml::Value::String(s) if !s.is_empty() => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Set (or with `None`, remove) `[section] key` in the file at `path`.
pub fn set_value(
    path: &Path,
    section: &str,
    key: &str,
    value: Option<toml::Value>,
) -> io::Result<()> {
    let mut doc = load_document(path).unwrap_or_default();

    let entry = doc
        .entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let table = entry
        .as_table_mut()
        .ok_or_else(|| io::Error::other(format!("[{section}] is not a table")))?;

    match value {
        Some(v) => {
            table.insert(key.to_string(), v);
        }
        None => {
            table.remove(key);
        }
    }

    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    write_atomic(path, &serialized).map_err(io::Error::other)
}
