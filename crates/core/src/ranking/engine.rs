use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::establishment::EstablishmentCandidate;
use crate::domain::search::{RankOutcome, ScoredResult, SearchQuery};
use crate::error::CoreError;
use crate::ranking::compose::compose;
use crate::ranking::config::RankingConfig;
use crate::ranking::normalizer::normalize_query;
use crate::ranking::order::{sort_results, total_score, ScoreInputs};
use crate::ranking::thematic::{Scorer, TieredScorer};

/// Stateless ranking pipeline. One engine is shared by every request; all
/// request data is passed to [`RankingEngine::rank`].
#[derive(Debug, Clone)]
pub struct RankingEngine<S = TieredScorer> {
    scorer: S,
    config: RankingConfig,
}

impl RankingEngine<TieredScorer> {
    pub fn new(config: RankingConfig) -> Result<Self, CoreError> {
        let scorer = TieredScorer::new(config.thematic.clone());
        Self::with_scorer(scorer, config)
    }
}

impl<S: Scorer> RankingEngine<S> {
    pub fn with_scorer(scorer: S, config: RankingConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { scorer, config })
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn rank(
        &self,
        query: &SearchQuery,
        candidates: &[Arc<EstablishmentCandidate>],
        now: DateTime<Utc>,
    ) -> Result<RankOutcome, CoreError> {
        let normalized = normalize_query(&query.envie)?;
        let local_now = now.with_timezone(&self.config.utc_offset()).naive_local();

        let mut warnings = Vec::new();
        let mut results = Vec::new();
        for candidate in candidates {
            let thematic = self.scorer.score(&normalized, candidate);
            let Some(availability) =
                compose(candidate, &query.origin, query.radius_km, local_now, &mut warnings)
            else {
                continue;
            };
            let total = total_score(
                ScoreInputs {
                    thematic_score: thematic.score,
                    distance_km: availability.distance_km,
                    radius_km: query.radius_km,
                    is_open: availability.is_open,
                    subscription: candidate.subscription,
                },
                &self.config,
            );
            results.push(ScoredResult {
                establishment: Arc::clone(candidate),
                thematic_score: thematic.score,
                distance_km: availability.distance_km,
                is_open: availability.is_open,
                matched_tags: thematic.matched_tags,
                total_score: total,
            });
        }

        sort_results(&mut results);
        let total = results.len();
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        Ok(RankOutcome {
            total,
            results,
            warnings,
        })
    }
}
