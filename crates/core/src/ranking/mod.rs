//! Desire-based relevance ranking.
//!
//! A request flows through a single synchronous pass:
//! normalize the desire, score every candidate thematically, attach distance
//! and opening state while dropping anything outside the radius, then order.

pub mod compose;
pub mod config;
pub mod engine;
pub mod lexicon;
pub mod normalizer;
pub mod order;
pub mod thematic;

pub use config::{RankingConfig, RankingWeights, ThematicWeights, TierPolicy};
pub use engine::RankingEngine;
pub use normalizer::{normalize_query, Intent, NormalizedQuery};
pub use thematic::{Scorer, ThematicMatch, TieredScorer};
