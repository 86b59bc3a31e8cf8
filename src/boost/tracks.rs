//! Per-track relationship weights.
//!
//! Some circuits reward a hot trainer–jockey combination more than others;
//! the weight scales each relationship's raw delta before capping.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BoostError, Result};

/// `(tj_weight, to_weight)`, both in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct TrackWeights {
    pub tj: f64,
    pub to: f64,
}

impl From<(f64, f64)> for TrackWeights {
    fn from((tj, to): (f64, f64)) -> Self {
        TrackWeights { tj, to }
    }
}

impl TrackWeights {
    fn validate(&self, track: &str) -> Result<()> {
        for (name, w) in [("tj", self.tj), ("to", self.to)] {
            if !(w > 0.0 && w <= 1.0) {
                return Err(BoostError::InvalidTrackWeights {
                    track: track.to_string(),
                    detail: format!("{name} weight {w} outside (0, 1]"),
                });
            }
        }
        Ok(())
    }
}

/// Weights used for unknown or missing track codes.
pub const DEFAULT_WEIGHTS: TrackWeights = TrackWeights { tj: 0.65, to: 0.45 };

/// Built-in presets: (code, tj, to).
const PRESETS: &[(&str, f64, f64)] = &[
    ("FG", 0.60, 0.50),
    ("OP", 0.70, 0.40),
    ("CD", 0.70, 0.40),
    ("GP", 0.75, 0.35),
    ("SAR", 0.65, 0.45),
    ("KEE", 0.65, 0.45),
    ("AQU", 0.60, 0.50),
    ("TP", 0.55, 0.55),
];

/// Override file layout: `{"default": [tj, to], "tracks": {"CD": [tj, to]}}`.
#[derive(Debug, Deserialize)]
struct TrackWeightOverrides {
    default: Option<TrackWeights>,
    #[serde(default)]
    tracks: HashMap<String, TrackWeights>,
}

/// Immutable track-code → weights table. Codes are stored upper-case.
#[derive(Debug, Clone)]
pub struct TrackWeightTable {
    weights: HashMap<String, TrackWeights>,
    default: TrackWeights,
}

impl TrackWeightTable {
    pub fn builtin() -> Self {
        let weights = PRESETS
            .iter()
            .map(|&(code, tj, to)| (code.to_string(), TrackWeights { tj, to }))
            .collect();
        TrackWeightTable {
            weights,
            default: DEFAULT_WEIGHTS,
        }
    }

    /// Build a table from explicit entries. Every weight must lie in (0, 1].
    pub fn new(
        entries: impl IntoIterator<Item = (String, TrackWeights)>,
        default: TrackWeights,
    ) -> Result<Self> {
        default.validate("default")?;
        let mut weights = HashMap::new();
        for (code, w) in entries {
            w.validate(&code)?;
            weights.insert(normalize_code(&code), w);
        }
        Ok(TrackWeightTable { weights, default })
    }

    /// Layer a JSON override document on top of this table.
    pub fn with_overrides_json(mut self, text: &str) -> Result<Self> {
        let overrides: TrackWeightOverrides = serde_json::from_str(text)?;
        if let Some(d) = overrides.default {
            d.validate("default")?;
            self.default = d;
        }
        for (code, w) in overrides.tracks {
            w.validate(&code)?;
            self.weights.insert(normalize_code(&code), w);
        }
        Ok(self)
    }

    /// Built-in table plus overrides read from `path`.
    pub fn load_overrides(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::builtin().with_overrides_json(&text)
    }

    /// Case-insensitive lookup; unknown or empty codes get the default pair.
    pub fn weights_for(&self, track_code: &str) -> TrackWeights {
        self.weights
            .get(&normalize_code(track_code))
            .copied()
            .unwrap_or(self.default)
    }

    pub fn default_weights(&self) -> TrackWeights {
        self.default
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
