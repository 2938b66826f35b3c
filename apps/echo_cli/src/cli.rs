use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;

/// Simulated face-similarity comparison between a reference and a target video.
#[derive(Parser, Debug)]
#[command(name = "face-echo", version)]
pub struct Args {
    /// Video containing the reference face (mp4, mov or webm)
    #[arg(long)]
    pub reference: Option<PathBuf>,
    /// Video to compare against the reference
    #[arg(long)]
    pub target: Option<PathBuf>,
    /// Settings file; defaults to ./face-echo.toml when present
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub tick_interval_ms: Option<u64>,
    #[arg(long)]
    pub max_duration_secs: Option<f64>,
    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
    /// Perturbation amplitude in percentage points; 0 disables randomness
    #[arg(long)]
    pub amplitude: Option<f64>,
    #[arg(long)]
    pub pass_threshold: Option<f64>,
    /// Print every stream event as a JSON line
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(v) = self.tick_interval_ms {
            settings.tick_interval_ms = v;
        }
        if let Some(v) = self.max_duration_secs {
            settings.max_duration_secs = v;
        }
        if let Some(v) = self.seed {
            settings.seed = Some(v);
        }
        if let Some(v) = self.amplitude {
            settings.amplitude = v;
        }
        if let Some(v) = self.pass_threshold {
            settings.pass_threshold = v;
        }
    }
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
