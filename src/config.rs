use clap::Parser;

use relboost::boost::model::{DEFAULT_CAP_STARTS, DEFAULT_MAX_TOTAL_BOOST_PP};
use relboost::boost::RelationshipParams;
use relboost::EngineSettings;

/// Trainer/jockey and trainer/owner relationship boosts for a field of runners
#[derive(Parser, Debug, Clone)]
#[command(name = "relboost", version, about)]
pub struct Config {
    /// JSON array of runner records to evaluate
    #[arg(long, env = "RUNNERS_PATH")]
    pub runners: String,

    /// Trainer–jockey statistic cache (JSON). Missing file disables TJ boosts.
    #[arg(long, env = "TJ_CACHE_PATH", default_value = "data/tj_cache.json")]
    pub tj_cache: String,

    /// Trainer–owner statistic cache (JSON). Missing file disables TO boosts.
    #[arg(long, env = "TO_CACHE_PATH", default_value = "data/to_cache.json")]
    pub to_cache: String,

    /// Statistic window used in cache keys
    #[arg(long, env = "STAT_WINDOW", default_value = "365d")]
    pub window: String,

    /// Optional JSON file overriding the built-in track weight table
    #[arg(long, env = "TRACK_WEIGHTS_PATH")]
    pub track_weights: Option<String>,

    /// Minimum trainer–jockey starts before a boost is considered
    #[arg(long, env = "TJ_MIN_STARTS", default_value = "30")]
    pub tj_min_starts: u32,

    /// Pseudo-count prior for trainer–jockey shrinkage
    #[arg(long, env = "TJ_PRIOR_STARTS", default_value = "80")]
    pub tj_prior_starts: u32,

    /// Cap on the trainer–jockey boost (percentage points)
    #[arg(long, env = "TJ_MAX_BOOST_PP", default_value = "4.0")]
    pub tj_max_boost_pp: f64,

    /// Minimum trainer–owner starts before a boost is considered
    #[arg(long, env = "TO_MIN_STARTS", default_value = "25")]
    pub to_min_starts: u32,

    /// Pseudo-count prior for trainer–owner shrinkage
    #[arg(long, env = "TO_PRIOR_STARTS", default_value = "100")]
    pub to_prior_starts: u32,

    /// Cap on the trainer–owner boost (percentage points)
    #[arg(long, env = "TO_MAX_BOOST_PP", default_value = "3.0")]
    pub to_max_boost_pp: f64,

    /// Starts at which confidence saturates
    #[arg(long, env = "CAP_STARTS", default_value_t = DEFAULT_CAP_STARTS)]
    pub cap_starts: u32,

    /// Cap on the combined boost of all relationships (percentage points)
    #[arg(long, env = "MAX_TOTAL_BOOST_PP", default_value_t = DEFAULT_MAX_TOTAL_BOOST_PP)]
    pub max_total_boost_pp: f64,

    /// Pretty-print the JSON report
    #[arg(long, env = "PRETTY_JSON", default_value = "false")]
    pub pretty: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window.trim().is_empty() {
            anyhow::bail!("window must not be empty");
        }
        for (label, min_starts) in [("tj", self.tj_min_starts), ("to", self.to_min_starts)] {
            if self.cap_starts <= min_starts {
                anyhow::bail!(
                    "cap_starts ({}) must exceed {}_min_starts ({})",
                    self.cap_starts,
                    label,
                    min_starts
                );
            }
        }
        for (label, cap) in [
            ("tj_max_boost_pp", self.tj_max_boost_pp),
            ("to_max_boost_pp", self.to_max_boost_pp),
        ] {
            if !cap.is_finite() || cap <= 0.0 {
                anyhow::bail!("{} must be a positive number", label);
            }
        }
        if !self.max_total_boost_pp.is_finite() || self.max_total_boost_pp < 0.0 {
            anyhow::bail!("max_total_boost_pp must be non-negative");
        }
        Ok(())
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            window: self.window.trim().to_string(),
            tj: RelationshipParams {
                min_starts: self.tj_min_starts,
                prior_starts: self.tj_prior_starts,
                max_boost_pp: self.tj_max_boost_pp,
            },
            to: RelationshipParams {
                min_starts: self.to_min_starts,
                prior_starts: self.to_prior_starts,
                max_boost_pp: self.to_max_boost_pp,
            },
            cap_starts: self.cap_starts,
            max_total_boost_pp: self.max_total_boost_pp,
        }
    }
}
