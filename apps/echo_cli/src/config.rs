use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use similarity_core::{model::DEFAULT_PASS_THRESHOLD, StreamConfig, SyntheticSource};

pub const DEFAULT_CONFIG_FILE: &str = "face-echo.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_interval_ms: u64,
    pub max_duration_secs: f64,
    pub amplitude: f64,
    pub seed: Option<u64>,
    pub pass_threshold: f64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            max_duration_secs: 20.0,
            amplitude: 5.0,
            seed: None,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn stream_config(&self) -> anyhow::Result<StreamConfig> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        let max_duration = Duration::try_from_secs_f64(self.max_duration_secs)
            .with_context(|| format!("invalid max_duration_secs {}", self.max_duration_secs))?;
        let config = StreamConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            max_duration,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn source(&self) -> SyntheticSource {
        let source = match self.seed {
            Some(seed) => SyntheticSource::seeded(seed),
            None => SyntheticSource::from_entropy(),
        };
        source.with_amplitude(self.amplitude)
    }
}

/// Defaults, then the TOML file, then `APP__*` environment variables.
///
/// An explicitly requested file must exist; the default file is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit_path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                Settings::default()
            }
        }
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

/// Unparseable values are ignored and keep the previous layer.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("APP__TICK_INTERVAL_MS").and_then(|v| v.trim().parse().ok()) {
        settings.tick_interval_ms = v;
    }
    if let Some(v) = lookup("APP__MAX_DURATION_SECS").and_then(|v| v.trim().parse().ok()) {
        settings.max_duration_secs = v;
    }
    if let Some(v) = lookup("APP__AMPLITUDE").and_then(|v| v.trim().parse().ok()) {
        settings.amplitude = v;
    }
    if let Some(v) = lookup("APP__SEED").and_then(|v| v.trim().parse().ok()) {
        settings.seed = Some(v);
    }
    if let Some(v) = lookup("APP__PASS_THRESHOLD").and_then(|v| v.trim().parse().ok()) {
        settings.pass_threshold = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        if !v.trim().is_empty() {
            settings.log_filter = v;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
