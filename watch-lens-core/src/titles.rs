//! Title cleanup and rewatch statistics.
//!
//! Titles are cleaned for reporting only. Filtering here never changes which
//! records are sent for remote analysis.

use std::collections::{HashMap, HashSet};

use crate::record::WatchRecord;

/// Prefix the history export puts in front of every title.
pub const WATCHED_PREFIX: &str = "Watched ";

/// Lowercase substrings that exclude a title from the statistics.
pub const FILTER_WORDS: &[&str] = &["short", "#", "https"];

/// Number of entries in the default rewatch ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Clean a single raw title.
///
/// Strips the "Watched " prefix, rejects titles containing non-ASCII
/// characters or any of [`FILTER_WORDS`] (case-insensitive), and keeps only
/// the text before the first newline. Returns `None` for rejected titles.
pub fn normalize_title(raw: &str) -> Option<String> {
    let title = raw.strip_prefix(WATCHED_PREFIX).unwrap_or(raw);

    if !title.is_ascii() {
        return None;
    }

    let lower = title.to_lowercase();
    if FILTER_WORDS.iter().any(|word| lower.contains(word)) {
        return None;
    }

    let title = match title.split_once('\n') {
        Some((first, _)) => first,
        None => title,
    };
    Some(title.to_string())
}

/// Cleaned titles of a history plus their frequency counts.
#[derive(Debug, Clone, Default)]
pub struct TitleStats {
    /// Surviving titles in input order, duplicates kept.
    titles: Vec<String>,
    /// Distinct titles in order of first occurrence, with counts.
    counts: Vec<(String, usize)>,
    /// Total records inspected, including rejected ones.
    records_seen: usize,
}

impl TitleStats {
    /// Clean every record's title and count occurrences.
    pub fn from_records(records: &[WatchRecord]) -> Self {
        Self::from_titles(records.iter().map(|r| r.title.as_str()))
    }

    pub fn from_titles<'a>(raw_titles: impl IntoIterator<Item = &'a str>) -> Self {
        let mut titles = Vec::new();
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut records_seen = 0;

        for raw in raw_titles {
            records_seen += 1;
            let Some(title) = normalize_title(raw) else {
                continue;
            };
            match index.get(&title) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(title.clone(), counts.len());
                    counts.push((title.clone(), 1));
                }
            }
            titles.push(title);
        }

        log::debug!(
            "Title cleanup kept {} of {} titles ({} distinct)",
            titles.len(),
            records_seen,
            counts.len()
        );

        Self {
            titles,
            counts,
            records_seen,
        }
    }

    /// Surviving titles in input order.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn total(&self) -> usize {
        self.titles.len()
    }

    /// Number of distinct surviving titles.
    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    pub fn unique_titles(&self) -> HashSet<&str> {
        self.counts.iter().map(|(t, _)| t.as_str()).collect()
    }

    /// Number of records rejected by the filters.
    pub fn rejected(&self) -> usize {
        self.records_seen - self.titles.len()
    }

    /// Titles seen at least twice, in order of first occurrence.
    pub fn rewatched(&self) -> Vec<(&str, usize)> {
        self.counts
            .iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(title, count)| (title.as_str(), *count))
            .collect()
    }

    /// Occurrence count of a cleaned title (0 when absent).
    pub fn count_of(&self, title: &str) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// The `n` most rewatched titles, highest count first.
    ///
    /// The sort is stable, so titles with equal counts keep the order in
    /// which they first appeared in the history.
    pub fn top_rewatched(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked = self.rewatched();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
#[path = "tests/titles_tests.rs"]
mod tests;
