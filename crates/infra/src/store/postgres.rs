use async_trait::async_trait;
use envie_core::types::geo::GeoPoint;
use tracing::debug;

use super::{ingest, Candidates, EstablishmentStore, StoreError};
use crate::db::establishments_repo::{count_approved, fetch_in_bounding_box};
use crate::db::DbPool;

/// Queries the establishments table on every request. Caching, if any, is the
/// database's concern.
pub struct PgEstablishmentStore {
    pool: DbPool,
}

impl PgEstablishmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn fetch(&self, origin: GeoPoint, radius_km: f64) -> Result<Candidates, StoreError> {
        let bbox = origin.bounding_box(radius_km);
        let records = fetch_in_bounding_box(&self.pool, &bbox).await?;
        debug!(rows = records.len(), ?bbox, "establishments fetched");
        Ok(ingest(records))
    }
}

#[async_trait]
impl EstablishmentStore for PgEstablishmentStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn find_candidates_near(&self, origin: GeoPoint, radius_km: f64) -> Result<Candidates, StoreError> {
        self.fetch(origin, radius_km).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count = count_approved(&self.pool).await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
