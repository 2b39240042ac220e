use std::sync::Arc;
use std::time::{Duration, Instant};

use envie_core::clock::Clock;
use envie_core::domain::search::{PartialDataWarning, RankOutcome, SearchQuery};
use envie_core::error::CoreError;
use envie_core::ranking::RankingEngine;
use envie_infra::store::{EstablishmentStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error("establishment store unavailable: {0}")]
    Upstream(#[from] StoreError),
    #[error("establishment store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Fetches candidates and runs the ranking engine for one request.
///
/// The query is validated by [`SearchQuery::new`] before it gets here, so a
/// bad request never reaches the store.
pub struct SearchService {
    engine: RankingEngine,
    store: Arc<dyn EstablishmentStore>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl SearchService {
    pub fn new(
        engine: RankingEngine,
        store: Arc<dyn EstablishmentStore>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            store,
            clock,
            store_timeout,
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<RankOutcome, SearchError> {
        let started = Instant::now();
        let fetch = self.store.find_candidates_near(query.origin, query.radius_km);
        // Dropping the fetch on timeout cancels the underlying query.
        let candidates = tokio::time::timeout(self.store_timeout, fetch)
            .await
            .map_err(|_| SearchError::Timeout(self.store_timeout))??;
        let fetched = candidates.len();

        let outcome = self.engine.rank(query, &candidates, self.clock.now())?;
        log_warnings(&outcome.warnings);
        info!(
            envie = %query.envie,
            radius_km = query.radius_km,
            fetched,
            total = outcome.total,
            returned = outcome.results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "envie search served"
        );
        Ok(outcome)
    }
}

fn log_warnings(warnings: &[PartialDataWarning]) {
    for warning in warnings {
        match warning {
            PartialDataWarning::MissingLocation { id } => {
                warn!(establishment_id = %id, "establishment without location skipped");
            }
            PartialDataWarning::MissingSchedule { id } => {
                debug!(establishment_id = %id, "establishment without opening hours treated as closed");
            }
        }
    }
}
