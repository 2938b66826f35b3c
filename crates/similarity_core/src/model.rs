//! Synthetic similarity curve and score classification.

use serde::{Deserialize, Serialize};

pub const BASE_SIMILARITY: f64 = 40.0;
pub const SIMILARITY_SLOPE_PER_SEC: f64 = 5.0;
pub const SIMILARITY_CEILING: f64 = 95.0;
pub const DEFAULT_PERTURBATION: f64 = 5.0;
pub const DEFAULT_PASS_THRESHOLD: f64 = 75.0;
pub const MEDIUM_BAND_FLOOR: f64 = 50.0;

/// Loosely increasing curve the simulation perturbs: `min(95, 40 + 5 * elapsed)`.
pub fn base_similarity(elapsed_secs: f64) -> f64 {
    (BASE_SIMILARITY + elapsed_secs * SIMILARITY_SLOPE_PER_SEC).min(SIMILARITY_CEILING)
}

/// Clamps into `[0, 100]`. Returns `None` for NaN so callers can treat it as a failed tick.
pub fn clamp_similarity(value: f64) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    Some(value.clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// `None` until there is a positive measurement to judge.
    pub fn from_similarity(similarity: f64, pass_threshold: f64) -> Option<Self> {
        if similarity.is_nan() || similarity <= 0.0 {
            return None;
        }
        if similarity >= pass_threshold {
            Some(Verdict::Pass)
        } else {
            Some(Verdict::Fail)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    Low,
    Medium,
    High,
}

impl SimilarityBand {
    /// `High` starts at the pass threshold so the band always agrees with [`Verdict`].
    pub fn of(similarity: f64, pass_threshold: f64) -> Self {
        if similarity >= pass_threshold {
            SimilarityBand::High
        } else if similarity < MEDIUM_BAND_FLOOR {
            SimilarityBand::Low
        } else {
            SimilarityBand::Medium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SimilarityBand::Low => "low",
            SimilarityBand::Medium => "medium",
            SimilarityBand::High => "high",
        }
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
