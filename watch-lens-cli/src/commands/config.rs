use std::io::Write;

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

use watch_lens_analysis::config::save_setting;
use watch_lens_analysis::{ConfigOverrides, ConfigSource, ResolvedConfig};
use watch_lens_lib::settings;

use crate::error::CliError;

fn mask_value(s: &str) -> String {
    match s.char_indices().nth(4) {
        Some((end, _)) => format!("{}****", &s[..end]),
        None => "****".to_string(),
    }
}

fn log_setting(name: &str, value: Option<String>, source: &ConfigSource) {
    let source_str = format!("({})", source);
    let label = format!("{}:", name);
    match value {
        Some(v) => log::info!(
            "  {} {} {}",
            label.if_supports_color(Stderr, |t| t.cyan()),
            v,
            source_str.if_supports_color(Stderr, |t| t.dimmed()),
        ),
        None => log::info!(
            "  {} {} {}",
            label.if_supports_color(Stderr, |t| t.cyan()),
            "not set".if_supports_color(Stderr, |t| t.yellow()),
            source_str.if_supports_color(Stderr, |t| t.dimmed()),
        ),
    }
}

/// Show current settings and their sources.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings::config_path();
    let resolved = ResolvedConfig::load(&ConfigOverrides::default())?;

    log::info!(
        "{}",
        "watch-lens Configuration".if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!("");

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stderr, |t| t.cyan()),
                "(exists)".if_supports_color(Stderr, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stderr, |t| t.cyan()),
                "(not found)".if_supports_color(Stderr, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stderr, |t| t.red()),
            );
        }
    }
    log::info!("");

    log_setting(
        "api_key",
        resolved.api_key.as_ref().map(|k| mask_value(&k.value)),
        &resolved.api_key_source(),
    );
    log_setting(
        "model",
        Some(resolved.model.value.clone()),
        &resolved.model.source,
    );
    log_setting(
        "base_url",
        Some(resolved.base_url.value.clone()),
        &resolved.base_url.source,
    );
    log_setting(
        "timeout_secs",
        Some(resolved.timeout_secs.value.to_string()),
        &resolved.timeout_secs.source,
    );
    log_setting(
        "batch_size",
        Some(resolved.batch_size.value.to_string()),
        &resolved.batch_size.source,
    );
    log_setting(
        "output_dir",
        Some(resolved.output_dir.value.display().to_string()),
        &resolved.output_dir.source,
    );
    match &resolved.mirror_dir {
        Some(dir) => log_setting(
            "mirror_dir",
            Some(dir.value.display().to_string()),
            &dir.source,
        ),
        None => log_setting("mirror_dir", None, &ConfigSource::Missing),
    }
    Ok(())
}

fn read_line(prompt: &str, default: Option<&str>) -> Result<Option<String>, CliError> {
    match default {
        Some(def) => print!("  {} [{}]: ", prompt, def),
        None => print!("  {}: ", prompt),
    }
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

/// Interactively set the API key and analysis defaults.
///
/// Empty answers keep the current value.
pub(crate) fn run_config_setup() -> Result<(), CliError> {
    println!(
        "{}",
        "watch-lens Setup".if_supports_color(Stdout, |t| t.bold()),
    );
    println!(
        "  {}",
        "Press Enter to keep the value in brackets.".if_supports_color(Stdout, |t| t.dimmed()),
    );
    println!();

    let current = ResolvedConfig::load(&ConfigOverrides::default())?;
    let masked_key = current.api_key.as_ref().map(|k| mask_value(&k.value));

    let mut path = None;
    if let Some(key) = read_line("api_key", masked_key.as_deref())? {
        path = Some(save_setting("gemini", "api_key", Some(toml::Value::String(key)))?);
    }
    if let Some(model) = read_line("model", Some(&current.model.value))? {
        path = Some(save_setting("gemini", "model", Some(toml::Value::String(model)))?);
    }
    let size = current.batch_size.value.to_string();
    if let Some(raw) = read_line("batch_size", Some(&size))? {
        match raw.parse::<i64>() {
            Ok(n) if n > 0 => {
                path = Some(save_setting("analysis", "batch_size", Some(toml::Value::Integer(n)))?);
            }
            _ => println!(
                "    {}",
                "Batch size must be a positive integer; keeping the current value."
                    .if_supports_color(Stdout, |t| t.yellow()),
            ),
        }
    }
    let output = current.output_dir.value.display().to_string();
    if let Some(dir) = read_line("output_dir", Some(&output))? {
        path = Some(save_setting("analysis", "output_dir", Some(toml::Value::String(dir)))?);
    }

    println!();
    match path {
        Some(p) => println!(
            "{} Settings saved to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            p.display().if_supports_color(Stdout, |t| t.cyan()),
        ),
        None => println!("No changes."),
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match settings::config_path() {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => Err(CliError::Analysis(
            watch_lens_analysis::AnalysisError::config("Could not determine config directory"),
        )),
    }
}
