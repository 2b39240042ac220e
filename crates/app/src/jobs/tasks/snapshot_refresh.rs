use tracing::{debug, info};

use crate::jobs::JobError;
use envie_infra::store::{RefreshOutcome, SnapshotStore};

pub async fn run(snapshot: &SnapshotStore) -> Result<(), JobError> {
    match snapshot.refresh().await? {
        RefreshOutcome::Unchanged => debug!("snapshot unchanged"),
        RefreshOutcome::Reloaded { count } => info!(count, "snapshot refresh picked up a new file"),
    }
    Ok(())
}
