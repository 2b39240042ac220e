use std::cmp::Ordering;

use crate::domain::establishment::SubscriptionTier;
use crate::domain::search::ScoredResult;
use crate::ranking::config::RankingConfig;

/// Inputs of the composite score for a single candidate.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub thematic_score: f64,
    pub distance_km: f64,
    pub radius_km: f64,
    pub is_open: bool,
    pub subscription: SubscriptionTier,
}

/// Totals are kept at the precision clients see, so two results that display
/// the same score are ordered by id.
const SCORE_SCALE: f64 = 1000.0;

pub fn total_score(inputs: ScoreInputs, config: &RankingConfig) -> f64 {
    let weights = &config.ranking;
    let proximity = if inputs.radius_km > 0.0 {
        (1.0 - inputs.distance_km / inputs.radius_km).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let mut total = inputs.thematic_score * weights.thematic_factor + weights.distance * proximity;
    if inputs.is_open {
        total += weights.open_bonus;
    }
    if inputs.subscription == SubscriptionTier::Premium {
        total += config.tiers.premium_boost;
    }
    (total * SCORE_SCALE).round() / SCORE_SCALE
}

/// Highest total first; equal totals fall back to ascending id.
pub fn compare(left: &ScoredResult, right: &ScoredResult) -> Ordering {
    right
        .total_score
        .total_cmp(&left.total_score)
        .then_with(|| left.establishment.id.cmp(&right.establishment.id))
}

pub fn sort_results(results: &mut [ScoredResult]) {
    results.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::establishment::EstablishmentCandidate;

    fn inputs(thematic_score: f64, distance_km: f64, is_open: bool) -> ScoreInputs {
        ScoreInputs {
            thematic_score,
            distance_km,
            radius_km: 10.0,
            is_open,
            subscription: SubscriptionTier::Standard,
        }
    }

    fn result(id: &str, total_score: f64) -> ScoredResult {
        ScoredResult {
            establishment: Arc::new(EstablishmentCandidate::new(id, id)),
            thematic_score: 0.0,
            distance_km: 0.0,
            is_open: false,
            matched_tags: Vec::new(),
            total_score,
        }
    }

    #[test]
    fn thematic_relevance_dominates_proximity_and_opening() {
        let config = RankingConfig::default();
        let relevant_far_closed = total_score(inputs(2.0, 9.9, false), &config);
        let irrelevant_here_open = total_score(inputs(0.0, 0.0, true), &config);
        assert!(relevant_far_closed > irrelevant_here_open);
    }

    #[test]
    fn closer_wins_at_equal_relevance() {
        let config = RankingConfig::default();
        assert!(total_score(inputs(6.0, 1.0, false), &config) > total_score(inputs(6.0, 4.0, false), &config));
    }

    #[test]
    fn open_wins_at_equal_relevance_and_distance() {
        let config = RankingConfig::default();
        assert!(total_score(inputs(6.0, 3.0, true), &config) > total_score(inputs(6.0, 3.0, false), &config));
    }

    #[test]
    fn premium_boost_applies_only_to_premium() {
        let mut config = RankingConfig::default();
        config.tiers.premium_boost = 0.25;
        let mut premium = inputs(0.0, 10.0, false);
        premium.subscription = SubscriptionTier::Premium;
        assert_eq!(total_score(premium, &config), 0.25);
        assert_eq!(total_score(inputs(0.0, 10.0, false), &config), 0.0);
    }

    #[test]
    fn near_equal_totals_tie_and_fall_back_to_id() {
        let config = RankingConfig::default();
        let here = total_score(inputs(6.0, 0.0, false), &config);
        let one_and_a_half_metres = total_score(inputs(6.0, 0.0015, false), &config);
        assert_eq!(here, one_and_a_half_metres);

        let mut results = vec![result("b", here), result("a", one_and_a_half_metres)];
        sort_results(&mut results);
        let ids: Vec<&str> = results.iter().map(|r| r.establishment.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn ties_break_on_ascending_id() {
        let mut results = vec![result("c", 1.0), result("a", 1.0), result("b", 3.0)];
        sort_results(&mut results);
        let ids: Vec<&str> = results.iter().map(|r| r.establishment.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
