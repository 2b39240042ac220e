use std::sync::Arc;

use crate::domain::establishment::EstablishmentCandidate;
use crate::error::CoreError;
use crate::types::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub envie: String,
    pub radius_km: f64,
    pub origin: GeoPoint,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(envie: &str, radius_km: f64, origin: GeoPoint) -> Result<Self, CoreError> {
        let envie = envie.trim();
        if envie.is_empty() {
            return Err(CoreError::InvalidQuery("envie must not be empty".to_string()));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(CoreError::InvalidQuery(format!(
                "radius must be a positive number of km, got {radius_km}"
            )));
        }
        Ok(Self {
            envie: envie.to_string(),
            radius_km,
            origin,
            limit: None,
        })
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Non-fatal data problems met while ranking a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialDataWarning {
    MissingLocation { id: String },
    MissingSchedule { id: String },
}

#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub establishment: Arc<EstablishmentCandidate>,
    pub thematic_score: f64,
    pub distance_km: f64,
    pub is_open: bool,
    pub matched_tags: Vec<String>,
    pub total_score: f64,
}

impl ScoredResult {
    pub fn is_relevant(&self) -> bool {
        self.thematic_score > 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankOutcome {
    /// Number of candidates inside the radius, before any limit.
    pub total: usize,
    pub results: Vec<ScoredResult>,
    pub warnings: Vec<PartialDataWarning>,
}
