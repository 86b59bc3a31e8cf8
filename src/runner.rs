use serde::{Deserialize, Serialize};

use crate::boost::BoostResult;
use crate::error::BoostError;

/// One runner as supplied by the race-card pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRunner")]
pub struct RunnerRecord {
    pub name: String,
    pub trainer: String,
    pub jockey: String,
    pub owner: String,
    /// Trainer's overall strike rate (0.0–1.0), the yardstick for both
    /// relationships.
    pub baseline_win_pct: f64,
    /// Win probability before relationship adjustments (0.0–1.0).
    pub base_prob: f64,
    pub track_code: String,
    pub surface: String,
    pub distance_bucket: String,
    pub class_bucket: String,
}

/// Unchecked wire form of [`RunnerRecord`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawRunner {
    pub name: String,
    #[serde(default)]
    pub trainer: String,
    #[serde(default)]
    pub jockey: String,
    #[serde(default)]
    pub owner: String,
    pub baseline_win_pct: f64,
    pub base_prob: f64,
    #[serde(default)]
    pub track_code: Option<String>,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub distance_bucket: Option<String>,
    #[serde(default)]
    pub class_bucket: Option<String>,
}

impl TryFrom<RawRunner> for RunnerRecord {
    type Error = BoostError;

    fn try_from(raw: RawRunner) -> Result<Self, Self::Error> {
        for (field, value) in [
            ("baseline_win_pct", raw.baseline_win_pct),
            ("base_prob", raw.base_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BoostError::InvalidRunner {
                    runner: raw.name.clone(),
                    detail: format!("{field} {value} outside [0, 1]"),
                });
            }
        }
        Ok(RunnerRecord {
            name: raw.name,
            trainer: raw.trainer,
            jockey: raw.jockey,
            owner: raw.owner,
            baseline_win_pct: raw.baseline_win_pct,
            base_prob: raw.base_prob,
            track_code: raw.track_code.unwrap_or_default(),
            surface: raw.surface.unwrap_or_default(),
            distance_bucket: raw.distance_bucket.unwrap_or_default(),
            class_bucket: raw.class_bucket.unwrap_or_default(),
        })
    }
}

/// Relationship-adjusted view of one runner.
#[derive(Debug, Clone, Serialize)]
pub struct RunnerBoost {
    pub runner: String,
    pub tj_boost_pp: f64,
    pub to_boost_pp: f64,
    /// Sum of both boosts after the total cap.
    pub total_boost_pp: f64,
    pub base_prob: f64,
    pub adjusted_prob: f64,
    pub fair_odds: String,
    pub tj: BoostResult,
    pub to: BoostResult,
}
