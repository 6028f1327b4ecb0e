use std::path::PathBuf;
use std::time::Duration;

use watch_lens_core::{CategoryTaxonomy, DEFAULT_BATCH_SIZE};
use watch_lens_lib::settings;

use crate::error::AnalysisError;
use crate::prompt::DEFAULT_INSTRUCTIONS;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";

/// Connection settings for the generative-text service.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout; an expired request counts as a transport failure.
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full `generateContent` URL, without the key query parameter.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// What the orchestrator needs besides a model: instructions, batch size and
/// the optional category table.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Instruction preamble placed at the top of every prompt.
    pub instructions: String,
    pub batch_size: usize,
    pub taxonomy: CategoryTaxonomy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            taxonomy: CategoryTaxonomy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Use `instructions` when given, otherwise the built-in default.
    pub fn new(instructions: Option<String>) -> Self {
        Self {
            instructions: instructions.unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            ..Self::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: CategoryTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }
}

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed on the command line.
    Cli,
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "command line"),
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Values supplied on the command line; `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub batch_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub mirror_dir: Option<PathBuf>,
}

/// A resolved value together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
}

/// Fully layered configuration: CLI > environment > config file > default.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: Option<Sourced<String>>,
    pub model: Sourced<String>,
    pub base_url: Sourced<String>,
    pub timeout_secs: Sourced<u64>,
    pub batch_size: Sourced<usize>,
    pub output_dir: Sourced<PathBuf>,
    pub mirror_dir: Option<Sourced<PathBuf>>,
}

impl ResolvedConfig {
    /// Resolve against the process environment and the user's config file.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, AnalysisError> {
        let doc = settings::config_path().and_then(|p| settings::load_document(&p));
        Self::resolve(overrides, |var| std::env::var(var).ok(), doc.as_ref())
    }

    /// Layering logic, independent of where the lower layers come from.
    pub fn resolve(
        overrides: &ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
        file: Option<&toml::Table>,
    ) -> Result<Self, AnalysisError> {
        let from_file =
            |section: &str, key: &str| file.and_then(|doc| settings::get_string(doc, section, key));

        let string_layer = |cli: &Option<String>, var: &'static str, section: &str, key: &str| {
            if let Some(v) = cli.clone().filter(|v| !v.is_empty()) {
                return Some(Sourced {
                    value: v,
                    source: ConfigSource::Cli,
                });
            }
            if let Some(v) = env(var).filter(|v| !v.is_empty()) {
                return Some(Sourced {
                    value: v,
                    source: ConfigSource::EnvVar(var),
                });
            }
            from_file(section, key).map(|v| Sourced {
                value: v,
                source: ConfigSource::ConfigFile,
            })
        };

        let api_key = string_layer(&overrides.api_key, ENV_API_KEY, "gemini", "api_key");
        let model = string_layer(&overrides.model, ENV_MODEL, "gemini", "model")
            .unwrap_or_else(|| default_value(DEFAULT_MODEL.to_string()));
        let base_url = string_layer(&overrides.base_url, ENV_BASE_URL, "gemini", "base_url")
            .unwrap_or_else(|| default_value(DEFAULT_BASE_URL.to_string()));

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => cli_value(secs),
            None => match from_file("gemini", "timeout_secs") {
                Some(raw) => file_value(parse_number::<u64>(&raw, "gemini.timeout_secs")?),
                None => default_value(DEFAULT_TIMEOUT_SECS),
            },
        };

        let batch_size = match overrides.batch_size {
            Some(size) => cli_value(size),
            None => match from_file("analysis", "batch_size") {
                Some(raw) => file_value(parse_number::<usize>(&raw, "analysis.batch_size")?),
                None => default_value(DEFAULT_BATCH_SIZE),
            },
        };
        if batch_size.value == 0 {
            return Err(AnalysisError::config(format!(
                "batch size must be greater than zero ({})",
                batch_size.source
            )));
        }

        let output_dir = match &overrides.output_dir {
            Some(dir) => cli_value(dir.clone()),
            None => match from_file("analysis", "output_dir") {
                Some(dir) => file_value(PathBuf::from(dir)),
                None => default_value(settings::default_output_dir()),
            },
        };

        let mirror_dir = match &overrides.mirror_dir {
            Some(dir) => Some(cli_value(dir.clone())),
            None => from_file("analysis", "mirror_dir").map(|d| file_value(PathBuf::from(d))),
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout_secs,
            batch_size,
            output_dir,
            mirror_dir,
        })
    }

    pub fn api_key_source(&self) -> ConfigSource {
        self.api_key
            .as_ref()
            .map(|k| k.source.clone())
            .unwrap_or(ConfigSource::Missing)
    }

    /// Build client settings; fails when no API key was found in any layer.
    pub fn gemini(&self) -> Result<GeminiSettings, AnalysisError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AnalysisError::config(format!(
                "Missing API key. Set {} or pass --api-key, or add api_key under [gemini] in the config file",
                ENV_API_KEY
            ))
        })?;
        Ok(GeminiSettings::new(api_key.value.clone())
            .with_model(self.model.value.clone())
            .with_base_url(self.base_url.value.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs.value)))
    }
}

fn cli_value<T>(value: T) -> Sourced<T> {
    Sourced {
        value,
        source: ConfigSource::Cli,
    }
}

fn file_value<T>(value: T) -> Sourced<T> {
    Sourced {
        value,
        source: ConfigSource::ConfigFile,
    }
}

fn default_value<T>(value: T) -> Sourced<T> {
    Sourced {
        value,
        source: ConfigSource::Default,
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, AnalysisError> {
    raw.trim()
        .parse()
        .map_err(|_| AnalysisError::config(format!("{key} must be a positive integer, got '{raw}'")))
}

/// Persist one `[gemini]` or `[analysis]` value to the user's config file.
/// Returns the path written.
pub fn save_setting(
    section: &str,
    key: &str,
    value: Option<toml::Value>,
) -> Result<PathBuf, AnalysisError> {
    let path = settings::config_path()
        .ok_or_else(|| AnalysisError::config("Could not determine config directory"))?;
    settings::set_value(&path, section, key, value)?;
    Ok(path)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
