//! Read-only access to establishment candidates.
//!
//! Stores ingest raw records into [`EstablishmentCandidate`]s (tags parsed,
//! schedules decoded) before handing them to the ranking engine, so nothing
//! is re-parsed per query.

pub mod postgres;
pub mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;
use envie_core::domain::establishment::{EstablishmentCandidate, EstablishmentRecord, IngestIssue};
use envie_core::types::geo::GeoPoint;
use thiserror::Error;
use tracing::{debug, warn};

pub use postgres::PgEstablishmentStore;
pub use snapshot::{RefreshOutcome, SnapshotStatus, SnapshotStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] crate::db::EstablishmentsRepoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("snapshot is stale ({age_secs}s old) and could not be reloaded")]
    Stale { age_secs: u64 },
}

pub type Candidates = Vec<Arc<EstablishmentCandidate>>;

#[async_trait]
pub trait EstablishmentStore: Send + Sync {
    /// Short name reported by the health endpoint.
    fn kind(&self) -> &'static str;

    /// Candidates that may lie within `radius_km` of `origin`. Stores may
    /// over-fetch; the ranking engine applies the exact radius.
    async fn find_candidates_near(&self, origin: GeoPoint, radius_km: f64) -> Result<Candidates, StoreError>;

    /// Number of establishments currently readable.
    async fn count(&self) -> Result<usize, StoreError>;
}

pub fn ingest<I>(records: I) -> Candidates
where
    I: IntoIterator<Item = EstablishmentRecord>,
{
    records
        .into_iter()
        .map(|record| {
            let (candidate, issues) = EstablishmentCandidate::from_record(record);
            for issue in issues {
                match issue {
                    IngestIssue::DroppedTag(raw) => {
                        debug!(establishment_id = %candidate.id, tag = %raw, "empty tag dropped");
                    }
                    IngestIssue::InvalidLocation(reason) | IngestIssue::InvalidSchedule(reason) => {
                        warn!(establishment_id = %candidate.id, %reason, "establishment data ignored");
                    }
                }
            }
            Arc::new(candidate)
        })
        .collect()
}
