//! Per-runner orchestration: ids → cache lookups → boosts → adjusted probability.

use tracing::debug;

use super::cache::{StatCache, StatContext};
use super::identity::make_id;
use super::model::{
    apply_boosts, relationship_boost, total_boost_pp, RelationshipParams, DEFAULT_CAP_STARTS,
    DEFAULT_MAX_TOTAL_BOOST_PP, DEFAULT_PRIOR_STARTS,
};
use super::odds::fair_odds;
use super::stats::BoostResult;
use super::tracks::TrackWeightTable;
use crate::error::Result;
use crate::runner::{RunnerBoost, RunnerRecord};

/// Engine-wide tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Statistic window, the third key field (e.g. "365d").
    pub window: String,
    pub tj: RelationshipParams,
    pub to: RelationshipParams,
    pub cap_starts: u32,
    pub max_total_boost_pp: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            window: "365d".to_string(),
            tj: RelationshipParams {
                min_starts: 30,
                prior_starts: DEFAULT_PRIOR_STARTS,
                max_boost_pp: 4.0,
            },
            to: RelationshipParams {
                min_starts: 25,
                prior_starts: 100,
                max_boost_pp: 3.0,
            },
            cap_starts: DEFAULT_CAP_STARTS,
            max_total_boost_pp: DEFAULT_MAX_TOTAL_BOOST_PP,
        }
    }
}

/// Evaluates trainer–jockey and trainer–owner boosts for runners.
///
/// Holds only read-only state, so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct BoostEngine {
    tj_cache: StatCache,
    to_cache: StatCache,
    tracks: TrackWeightTable,
    settings: EngineSettings,
}

impl BoostEngine {
    pub fn new(
        tj_cache: StatCache,
        to_cache: StatCache,
        tracks: TrackWeightTable,
        settings: EngineSettings,
    ) -> Self {
        BoostEngine {
            tj_cache,
            to_cache,
            tracks,
            settings,
        }
    }

    /// Compute both relationship boosts and the adjusted win probability.
    ///
    /// Missing data yields zero boosts; a corrupt cache record is an error.
    pub fn evaluate(&self, runner: &RunnerRecord) -> Result<RunnerBoost> {
        let trainer = make_id("trainer", &runner.trainer);
        let jockey = make_id("jockey", &runner.jockey);
        let owner = make_id("owner", &runner.owner);

        let ctx = StatContext {
            window: &self.settings.window,
            track_code: &runner.track_code,
            surface: &runner.surface,
            distance_bucket: &runner.distance_bucket,
            class_bucket: &runner.class_bucket,
        };
        let weights = self.tracks.weights_for(&runner.track_code);

        let tj_stats = self.tj_cache.lookup(&trainer, &jockey, &ctx)?;
        let to_stats = self.to_cache.lookup(&trainer, &owner, &ctx)?;

        let tj = relationship_boost(
            tj_stats.as_ref(),
            runner.baseline_win_pct,
            &self.settings.tj,
            self.settings.cap_starts,
            weights.tj,
            "TJ",
        );
        let to = relationship_boost(
            to_stats.as_ref(),
            runner.baseline_win_pct,
            &self.settings.to,
            self.settings.cap_starts,
            weights.to,
            "TO",
        );

        Ok(self.combine(runner, tj, to))
    }

    /// Evaluate a field of runners, stopping at the first corrupt record.
    pub fn evaluate_all(&self, runners: &[RunnerRecord]) -> Result<Vec<RunnerBoost>> {
        runners.iter().map(|r| self.evaluate(r)).collect()
    }

    fn combine(&self, runner: &RunnerRecord, tj: BoostResult, to: BoostResult) -> RunnerBoost {
        let cap = self.settings.max_total_boost_pp;
        let adjusted_prob = apply_boosts(runner.base_prob, &[&tj, &to], cap);
        let total = total_boost_pp(&[&tj, &to], cap);

        debug!(
            "{}: {} | {} | {:.3} → {:.3}",
            runner.name, tj.reason, to.reason, runner.base_prob, adjusted_prob
        );

        RunnerBoost {
            runner: runner.name.clone(),
            tj_boost_pp: tj.boost_points,
            to_boost_pp: to.boost_points,
            total_boost_pp: total,
            base_prob: runner.base_prob,
            adjusted_prob,
            fair_odds: fair_odds(adjusted_prob),
            tj,
            to,
        }
    }
}
