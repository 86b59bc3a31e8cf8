//! Relationship boost math.
//!
//! A relationship's joint strike rate is shrunk toward the runner's baseline
//! with a pseudo-count prior, the difference is weighted per track and capped,
//! and the capped deltas of every relationship are capped again as a total.
//!
//!   estimate = (wins + baseline · prior_starts) / (starts + prior_starts)
//!   boost_pp = clamp((estimate − baseline) · weight · 100, ±max_boost_pp)
//!
//! Samples below `min_starts` are ignored outright. Above the gate the
//! confidence score is reported but does not scale the boost.

use super::stats::{BoostResult, StatLine};

/// Default starts at which confidence saturates.
pub const DEFAULT_CAP_STARTS: u32 = 200;
/// Default pseudo-count given to the baseline rate.
pub const DEFAULT_PRIOR_STARTS: u32 = 80;
/// Default cap on the summed boost of all relationships.
pub const DEFAULT_MAX_TOTAL_BOOST_PP: f64 = 5.0;

/// Adjusted probabilities never reach 0 or 1.
pub const MIN_PROB: f64 = 0.001;
pub const MAX_PROB: f64 = 0.999;

/// Tuning for one relationship type (trainer–jockey, trainer–owner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationshipParams {
    /// Samples below this are ignored.
    pub min_starts: u32,
    pub prior_starts: u32,
    /// Cap on |boost| in percentage points.
    pub max_boost_pp: f64,
}

/// Clamp that maps NaN to `lo`, so the result is always inside the range.
fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Sample-size confidence in [0, 1].
///
/// Exactly 0 below `min_starts`; otherwise a linear ramp from `min_starts`
/// that reaches 1 at `cap_starts`. A cap at or below the minimum makes the
/// ramp a step: any sample that passes the gate gets full confidence.
pub fn confidence(starts: u32, min_starts: u32, cap_starts: u32) -> f64 {
    if starts < min_starts {
        return 0.0;
    }
    if cap_starts <= min_starts {
        return 1.0;
    }
    let span = (cap_starts - min_starts) as f64;
    clamp((starts - min_starts) as f64 / span, 0.0, 1.0)
}

/// Bayesian shrinkage of the observed strike rate toward `baseline_win_pct`.
pub fn shrink(rel: &StatLine, baseline_win_pct: f64, prior_starts: u32) -> f64 {
    let Some(observed) = rel.observed_rate() else {
        return baseline_win_pct;
    };
    let starts = rel.starts() as f64;
    let prior = prior_starts as f64;
    (observed * starts + baseline_win_pct * prior) / (starts + prior)
}

/// Evaluate one relationship for one runner.
///
/// `weight` is the track weight for this relationship type and `label`
/// prefixes the reason string (e.g. "TJ").
pub fn relationship_boost(
    rel: Option<&StatLine>,
    baseline_win_pct: f64,
    params: &RelationshipParams,
    cap_starts: u32,
    weight: f64,
    label: &str,
) -> BoostResult {
    let rel = match rel {
        Some(r) if r.starts() > 0 => r,
        _ => return BoostResult::zero(0, format!("{label}: no data")),
    };

    let conf = confidence(rel.starts(), params.min_starts, cap_starts);
    if conf == 0.0 {
        return BoostResult::zero(
            rel.starts(),
            format!("{label}: sample<{} (ignored)", params.min_starts),
        );
    }

    let shrunk = shrink(rel, baseline_win_pct, params.prior_starts);
    let raw_delta = shrunk - baseline_win_pct; // prob units
    let cap = params.max_boost_pp.abs();
    let weighted_pp = clamp(raw_delta * weight * 100.0, -cap, cap);

    let sign = if weighted_pp > 0.0 {
        "positive"
    } else if weighted_pp < 0.0 {
        "negative"
    } else {
        "neutral"
    };
    let reason = format!(
        "{label}: {sign} vs baseline (starts={}, win%={:.1}%)",
        rel.starts(),
        rel.win_pct() * 100.0
    );

    BoostResult::from_points(weighted_pp, conf, rel.starts(), reason)
}

/// Sum the boosts, cap the total and apply it to `base_prob`.
///
/// The result is always within [`MIN_PROB`, `MAX_PROB`].
pub fn apply_boosts(base_prob: f64, boosts: &[&BoostResult], max_total_boost_pp: f64) -> f64 {
    let total_pp = total_boost_pp(boosts, max_total_boost_pp);
    clamp(base_prob + total_pp / 100.0, MIN_PROB, MAX_PROB)
}

/// Capped total in percentage points, as applied by [`apply_boosts`].
pub fn total_boost_pp(boosts: &[&BoostResult], max_total_boost_pp: f64) -> f64 {
    let cap = max_total_boost_pp.abs();
    clamp(boosts.iter().map(|b| b.boost_points).sum(), -cap, cap)
}
