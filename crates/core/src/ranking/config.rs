use chrono::{FixedOffset, Offset, Utc};

use crate::error::CoreError;

/// Per-tier weights of the thematic scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ThematicWeights {
    pub desire: f64,
    pub activity: f64,
    pub tag: f64,
    /// Multiplier applied to each additional match within a tier.
    pub decay: f64,
}

impl Default for ThematicWeights {
    fn default() -> Self {
        Self {
            desire: 10.0,
            activity: 6.0,
            tag: 2.0,
            decay: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingWeights {
    pub thematic_factor: f64,
    /// Awarded in full at the origin, linearly down to zero at the radius.
    pub distance: f64,
    pub open_bonus: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            thematic_factor: 1.0,
            distance: 1.0,
            open_bonus: 0.5,
        }
    }
}

/// Subscription gating, passed in explicitly with every ranking call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TierPolicy {
    pub premium_boost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub thematic: ThematicWeights,
    pub ranking: RankingWeights,
    pub tiers: TierPolicy,
    /// Offset used to turn the request timestamp into local opening-hours time.
    pub utc_offset_minutes: i32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            thematic: ThematicWeights::default(),
            ranking: RankingWeights::default(),
            tiers: TierPolicy::default(),
            utc_offset_minutes: 60,
        }
    }
}

impl RankingConfig {
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let weights = [
            ("thematic.desire", self.thematic.desire),
            ("thematic.activity", self.thematic.activity),
            ("thematic.tag", self.thematic.tag),
            ("ranking.thematic_factor", self.ranking.thematic_factor),
            ("ranking.distance", self.ranking.distance),
            ("ranking.open_bonus", self.ranking.open_bonus),
            ("tiers.premium_boost", self.tiers.premium_boost),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(CoreError::InvalidConfig(format!(
                "utc offset out of range: {} minutes",
                self.utc_offset_minutes
            )));
        }
        if !(0.0..1.0).contains(&self.thematic.decay) {
            return Err(CoreError::InvalidConfig(format!(
                "thematic.decay must be in [0, 1), got {}",
                self.thematic.decay
            )));
        }
        Ok(())
    }

    /// True when the largest distance/open/premium contribution stays below
    /// the smallest non-zero thematic score.
    pub fn thematic_dominates(&self) -> bool {
        let smallest_thematic = [self.thematic.desire, self.thematic.activity, self.thematic.tag]
            .into_iter()
            .filter(|weight| *weight > 0.0)
            .fold(f64::INFINITY, f64::min)
            * self.ranking.thematic_factor;
        let secondary = self.ranking.distance + self.ranking.open_bonus + self.tiers.premium_boost;
        secondary < smallest_thematic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_thematic_first() {
        let config = RankingConfig::default();
        config.validate().unwrap();
        assert!(config.thematic_dominates());
        assert_eq!(config.utc_offset().local_minus_utc(), 3600);
    }

    #[test]
    fn reject_negative_weight() {
        let mut config = RankingConfig::default();
        config.ranking.distance = -1.0;
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn reject_decay_of_one() {
        let mut config = RankingConfig::default();
        config.thematic.decay = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_offset_beyond_a_day() {
        let mut config = RankingConfig::default();
        config.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
        assert_eq!(config.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn large_premium_boost_breaks_dominance() {
        let mut config = RankingConfig::default();
        config.tiers.premium_boost = 5.0;
        assert!(!config.thematic_dominates());
    }
}
