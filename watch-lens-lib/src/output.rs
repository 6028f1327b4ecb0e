//! Writing analysis results for the dashboard front end.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::IntakeError;

pub const DASHBOARD_FILE: &str = "dashboard-data.json";
pub const RAW_ANALYSIS_FILE: &str = "raw-analysis.json";

/// Where results are written.
///
/// The dashboard file goes to `output_dir` and, when set, is mirrored into
/// `mirror_dir` (typically the front end's static `public/output` folder).
/// The raw analysis is only written to `output_dir`.
#[derive(Debug, Clone)]
pub struct OutputTargets {
    pub output_dir: PathBuf,
    pub mirror_dir: Option<PathBuf>,
}

impl OutputTargets {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            mirror_dir: None,
        }
    }

    pub fn with_mirror(mut self, mirror_dir: Option<PathBuf>) -> Self {
        self.mirror_dir = mirror_dir;
        self
    }
}

/// Paths of the files produced by [`write_outputs`].
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub dashboard: PathBuf,
    pub raw_analysis: PathBuf,
    pub mirror: Option<PathBuf>,
}

/// Raw model output as it should be archived.
#[derive(Debug, Clone, Copy)]
pub enum RawAnalysis<'a> {
    /// The model's text could be parsed; archive it as pretty JSON.
    Parsed(&'a serde_json::Value),
    /// Unparsable text; archive it verbatim.
    Text(&'a str),
}

impl RawAnalysis<'_> {
    fn render(&self) -> Result<String, IntakeError> {
        match self {
            RawAnalysis::Parsed(value) => Ok(serde_json::to_string_pretty(value)?),
            RawAnalysis::Text(text) => Ok((*text).to_string()),
        }
    }
}

/// Write the dashboard and raw analysis files, creating directories as needed.
pub fn write_outputs<T: Serialize>(
    targets: &OutputTargets,
    dashboard: &T,
    raw: RawAnalysis<'_>,
) -> Result<WrittenFiles, IntakeError> {
    let dashboard_json = serde_json::to_string_pretty(dashboard)?;

    let dashboard_path = targets.output_dir.join(DASHBOARD_FILE);
    write_atomic(&dashboard_path, &dashboard_json)?;

    let raw_path = targets.output_dir.join(RAW_ANALYSIS_FILE);
    write_atomic(&raw_path, &raw.render()?)?;

    let mirror = match &targets.mirror_dir {
        Some(dir) => {
            let path = dir.join(DASHBOARD_FILE);
            write_atomic(&path, &dashboard_json)?;
            Some(path)
        }
        None => None,
    };

    log::debug!(
        "Wrote {} and {}",
        dashboard_path.display(),
        raw_path.display()
    );

    Ok(WrittenFiles {
        dashboard: dashboard_path,
        raw_analysis: raw_path,
        mirror,
    })
}

/// Write via a temporary sibling file and rename into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), IntakeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IntakeError::write(parent, e))?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents).map_err(|e| IntakeError::write(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| IntakeError::write(path, e))?;
    Ok(())
}
