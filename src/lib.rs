//! Relationship boosts for horse racing win probabilities.
//!
//! Historical trainer–jockey and trainer–owner strike rates are shrunk toward
//! the trainer's baseline, weighted per track, capped, and applied to a
//! runner's base win probability.

pub mod boost;
pub mod error;
pub mod runner;

pub use boost::{BoostEngine, BoostResult, EngineSettings, StatCache, StatLine, TrackWeightTable};
pub use error::{BoostError, Result};
pub use runner::{RunnerBoost, RunnerRecord};
