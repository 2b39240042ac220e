pub mod scheduler;
pub mod tasks;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::state::AppState;
use envie_infra::store::{SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The snapshot refresh job runs only when the snapshot store serves requests
/// and a non-zero interval is configured.
pub fn snapshot_refresh_target(state: &AppState) -> Option<Arc<SnapshotStore>> {
    if state.config.snapshot_refresh_interval.is_zero() {
        return None;
    }
    state.snapshot.clone()
}

pub async fn start(state: AppState, snapshot: Arc<SnapshotStore>) -> Result<(), JobError> {
    let interval = state.config.snapshot_refresh_interval;
    info!(
        path = %snapshot.path().display(),
        interval_secs = interval.as_secs(),
        "snapshot refresh scheduled"
    );
    scheduler::run_interval("snapshot_refresh", interval, move || {
        let snapshot = Arc::clone(&snapshot);
        async move { tasks::snapshot_refresh::run(&snapshot).await }
    })
    .await
}
