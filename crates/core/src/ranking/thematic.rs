use std::collections::HashSet;

use crate::domain::establishment::EstablishmentCandidate;
use crate::ranking::config::ThematicWeights;
use crate::ranking::lexicon::{is_generic_verb, is_stopword};
use crate::ranking::normalizer::NormalizedQuery;
use crate::types::tag::Tag;
use crate::types::text::{stem, words_related};

/// Shortest query term allowed to match a generic tag.
const MIN_TAG_TERM_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThematicMatch {
    pub score: f64,
    /// Labels of the tags that contributed, desire tags first.
    pub matched_tags: Vec<String>,
}

/// Computes how well a candidate answers a desire.
///
/// Implementations must return a finite, non-negative score and must never
/// reject a candidate: a score of zero only means "not thematically relevant".
pub trait Scorer: Send + Sync {
    fn score(&self, query: &NormalizedQuery, candidate: &EstablishmentCandidate) -> ThematicMatch;
}

/// Three-tier scorer: desire tags, then activities, then generic tags.
///
/// Each tier counts deduplicated matches and weights them with a geometric
/// decay, so the tenth matching tag adds almost nothing.
#[derive(Debug, Clone, Default)]
pub struct TieredScorer {
    weights: ThematicWeights,
}

impl TieredScorer {
    pub fn new(weights: ThematicWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ThematicWeights {
        &self.weights
    }

    fn tier_score(&self, matches: usize, weight: f64) -> f64 {
        let mut total = 0.0;
        let mut factor = 1.0;
        for _ in 0..matches {
            total += weight * factor;
            factor *= self.weights.decay;
        }
        total
    }
}

impl Scorer for TieredScorer {
    fn score(&self, query: &NormalizedQuery, candidate: &EstablishmentCandidate) -> ThematicMatch {
        if query.is_empty() {
            return ThematicMatch::default();
        }

        let thematic_tags: Vec<&Tag> = candidate.tags.iter().filter(|tag| tag.is_thematic()).collect();

        let mut seen = HashSet::new();
        let mut desire_labels = Vec::new();
        for tag in &thematic_tags {
            let Some(desire) = tag.desire() else {
                continue;
            };
            if desire_matches(desire, query) && seen.insert(tag.normalized()) {
                desire_labels.push(tag.label().to_string());
            }
        }

        let mut activity_hits = 0;
        for activity in &candidate.activities {
            if activity_matches(activity, query) {
                activity_hits += 1;
            }
        }

        let mut seen_generic = HashSet::new();
        let mut generic_labels = Vec::new();
        for tag in &thematic_tags {
            if tag.desire().is_some() || seen.contains(tag.normalized()) {
                continue;
            }
            if generic_tag_matches(tag, query) && seen_generic.insert(tag.normalized()) {
                generic_labels.push(tag.label().to_string());
            }
        }

        let score = self.tier_score(desire_labels.len(), self.weights.desire)
            + self.tier_score(activity_hits, self.weights.activity)
            + self.tier_score(generic_labels.len(), self.weights.tag);

        let mut matched_tags = desire_labels;
        matched_tags.extend(generic_labels);
        ThematicMatch {
            score,
            matched_tags,
        }
    }
}

fn desire_matches(desire: &str, query: &NormalizedQuery) -> bool {
    let words: Vec<&str> = desire
        .split(' ')
        .filter(|word| !word.is_empty() && !is_stopword(word))
        .map(stem)
        .collect();
    let specific: Vec<&str> = words.iter().copied().filter(|word| !is_generic_verb(word)).collect();
    let significant = if specific.is_empty() { words } else { specific };
    significant
        .iter()
        .any(|word| query.terms.iter().any(|term| words_related(word, term)))
}

fn activity_matches(activity: &str, query: &NormalizedQuery) -> bool {
    if query.activities().any(|detected| detected == activity) {
        return true;
    }
    activity
        .split(' ')
        .map(stem)
        .any(|word| query.terms.iter().any(|term| words_related(word, term)))
}

fn generic_tag_matches(tag: &Tag, query: &NormalizedQuery) -> bool {
    tag.normalized().split(' ').map(stem).any(|word| {
        query
            .terms
            .iter()
            .filter(|term| term.len() >= MIN_TAG_TERM_LEN)
            .any(|term| words_related(word, term))
    })
}
