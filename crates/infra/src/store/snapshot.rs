use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use envie_core::domain::establishment::{EstablishmentCandidate, EstablishmentRecord};
use envie_core::types::geo::GeoPoint;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{ingest, Candidates, EstablishmentStore, StoreError};

/// In-memory copy of an exported establishments file.
///
/// The copy is valid for `max_age`. It is refreshed by the background job and,
/// failing that, by the first request that finds it stale. A refresh only
/// re-parses the file when its modification time changed.
pub struct SnapshotStore {
    path: PathBuf,
    max_age: Duration,
    state: RwLock<SnapshotState>,
}

struct SnapshotState {
    candidates: Arc<[Arc<EstablishmentCandidate>]>,
    modified: Option<SystemTime>,
    loaded_at: DateTime<Utc>,
    checked_at: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStatus {
    pub path: String,
    pub count: usize,
    pub loaded_at: DateTime<Utc>,
    pub age_secs: u64,
    pub stale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Unchanged,
    Reloaded { count: usize },
}

impl SnapshotStore {
    pub async fn open(path: impl AsRef<Path>, max_age: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let (candidates, modified) = read_snapshot(&path).await?;
        info!(path = %path.display(), count = candidates.len(), "snapshot loaded");
        Ok(Self {
            path,
            max_age,
            state: RwLock::new(SnapshotState {
                candidates: candidates.into(),
                modified,
                loaded_at: Utc::now(),
                checked_at: Instant::now(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file if it changed since the last load.
    pub async fn refresh(&self) -> Result<RefreshOutcome, StoreError> {
        let modified = tokio::fs::metadata(&self.path).await?.modified().ok();
        {
            let mut guard = self.state.write().await;
            if modified.is_some() && modified == guard.modified {
                guard.checked_at = Instant::now();
                return Ok(RefreshOutcome::Unchanged);
            }
        }
        let count = self.reload().await?;
        Ok(RefreshOutcome::Reloaded { count })
    }

    /// Unconditionally re-reads the file.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let (candidates, modified) = read_snapshot(&self.path).await?;
        let count = candidates.len();
        let mut guard = self.state.write().await;
        guard.candidates = candidates.into();
        guard.modified = modified;
        guard.loaded_at = Utc::now();
        guard.checked_at = Instant::now();
        info!(path = %self.path.display(), count, "snapshot reloaded");
        Ok(count)
    }

    pub async fn status(&self) -> SnapshotStatus {
        let guard = self.state.read().await;
        let age = guard.checked_at.elapsed();
        SnapshotStatus {
            path: self.path.display().to_string(),
            count: guard.candidates.len(),
            loaded_at: guard.loaded_at,
            age_secs: age.as_secs(),
            stale: age > self.max_age,
        }
    }

    async fn current(&self) -> Result<Arc<[Arc<EstablishmentCandidate>]>, StoreError> {
        let (candidates, age) = {
            let guard = self.state.read().await;
            (Arc::clone(&guard.candidates), guard.checked_at.elapsed())
        };
        if age <= self.max_age {
            return Ok(candidates);
        }
        match self.refresh().await {
            Ok(_) => Ok(Arc::clone(&self.state.read().await.candidates)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "stale snapshot refresh failed");
                Err(StoreError::Stale {
                    age_secs: age.as_secs(),
                })
            }
        }
    }

    async fn near(&self, origin: GeoPoint, radius_km: f64) -> Result<Candidates, StoreError> {
        let candidates = self.current().await?;
        let bbox = origin.bounding_box(radius_km);
        Ok(candidates
            .iter()
            .filter(|candidate| candidate.location.is_none_or(|location| bbox.contains(&location)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EstablishmentStore for SnapshotStore {
    fn kind(&self) -> &'static str {
        "snapshot"
    }

    async fn find_candidates_near(&self, origin: GeoPoint, radius_km: f64) -> Result<Candidates, StoreError> {
        self.near(origin, radius_km).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().await.candidates.len())
    }
}

async fn read_snapshot(path: &Path) -> Result<(Candidates, Option<SystemTime>), StoreError> {
    let modified = tokio::fs::metadata(path).await?.modified().ok();
    let contents = tokio::fs::read_to_string(path).await?;
    let candidates = parse_snapshot(&contents)?;
    Ok((candidates, modified))
}

fn parse_snapshot(contents: &str) -> Result<Candidates, StoreError> {
    let records: Vec<EstablishmentRecord> = serde_json::from_str(contents)?;
    Ok(ingest(records))
}
