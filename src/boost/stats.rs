use serde::Serialize;

use crate::error::{BoostError, Result};

/// Historical performance summary for a (left, right) pair over a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatLine {
    starts: u32,
    wins: u32,
    /// Reported win rate (0.0–1.0). Not recomputed from `wins / starts`.
    win_pct: f64,
    roi: Option<f64>,
}

impl StatLine {
    /// Build a stat line, rejecting `wins > starts`, a `win_pct` outside
    /// [0, 1] and a non-finite `roi`.
    pub fn new(starts: u32, wins: u32, win_pct: f64, roi: Option<f64>) -> Result<Self> {
        if wins > starts {
            return Err(BoostError::InvalidStatLine(format!(
                "wins ({wins}) exceed starts ({starts})"
            )));
        }
        if !(0.0..=1.0).contains(&win_pct) {
            return Err(BoostError::InvalidStatLine(format!(
                "win_pct {win_pct} outside [0, 1]"
            )));
        }
        if let Some(r) = roi {
            if !r.is_finite() {
                return Err(BoostError::InvalidStatLine(format!("roi {r} is not finite")));
            }
        }
        Ok(StatLine {
            starts,
            wins,
            win_pct,
            roi,
        })
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn win_pct(&self) -> f64 {
        self.win_pct
    }

    pub fn roi(&self) -> Option<f64> {
        self.roi
    }

    /// Observed strike rate `wins / starts`, or `None` with no starts.
    pub fn observed_rate(&self) -> Option<f64> {
        if self.starts == 0 {
            None
        } else {
            Some(self.wins as f64 / self.starts as f64)
        }
    }
}

/// Outcome of evaluating one relationship type for one runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoostResult {
    /// Probability units (0.01 = +1pp)
    pub boost_prob: f64,
    /// Percentage points (+1.0 = +1pp)
    pub boost_points: f64,
    /// 0.0–1.0
    pub confidence: f64,
    pub used_starts: u32,
    pub reason: String,
}

impl BoostResult {
    /// A result that leaves the probability untouched.
    pub fn zero(used_starts: u32, reason: impl Into<String>) -> Self {
        BoostResult {
            boost_prob: 0.0,
            boost_points: 0.0,
            confidence: 0.0,
            used_starts,
            reason: reason.into(),
        }
    }

    /// Build a result from a percentage-point delta; `boost_prob` is derived.
    pub fn from_points(
        boost_points: f64,
        confidence: f64,
        used_starts: u32,
        reason: impl Into<String>,
    ) -> Self {
        BoostResult {
            boost_prob: boost_points / 100.0,
            boost_points,
            confidence: confidence.clamp(0.0, 1.0),
            used_starts,
            reason: reason.into(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.boost_points == 0.0
    }
}
