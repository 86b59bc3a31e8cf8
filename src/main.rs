use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod config;

use config::Config;
use relboost::{BoostEngine, RunnerRecord, StatCache, TrackWeightTable};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let tracks = match &config.track_weights {
        Some(path) => TrackWeightTable::load_overrides(path)
            .with_context(|| format!("Failed to load track weights from {}", path))?,
        None => TrackWeightTable::builtin(),
    };

    // Missing or unparsable caches degrade to empty (zero boosts), never an error.
    let tj_cache = StatCache::load(&config.tj_cache);
    let to_cache = StatCache::load(&config.to_cache);

    let runners_json = std::fs::read_to_string(&config.runners)
        .with_context(|| format!("Failed to read runners from {}", config.runners))?;
    let runners: Vec<RunnerRecord> =
        serde_json::from_str(&runners_json).context("Failed to parse runner records")?;
    info!("Loaded {} runner(s) from {}", runners.len(), config.runners);

    let engine = BoostEngine::new(tj_cache, to_cache, tracks, config.settings());
    let results = engine
        .evaluate_all(&runners)
        .context("Relationship boost evaluation failed")?;

    let boosted = results
        .iter()
        .filter(|r| r.tj_boost_pp != 0.0 || r.to_boost_pp != 0.0)
        .count();
    info!("Evaluated {} runner(s), {} with a relationship boost", results.len(), boosted);

    let report = if config.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", report);

    Ok(())
}
