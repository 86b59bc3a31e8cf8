pub mod cache;
pub mod engine;
pub mod identity;
pub mod model;
pub mod odds;
pub mod stats;
pub mod tracks;

pub use cache::{StatCache, StatContext};
pub use engine::{BoostEngine, EngineSettings};
pub use identity::make_id;
pub use model::{apply_boosts, confidence, relationship_boost, shrink, RelationshipParams};
pub use odds::fair_odds;
pub use stats::{BoostResult, StatLine};
pub use tracks::{TrackWeightTable, TrackWeights};
