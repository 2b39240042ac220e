use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;
use envie_infra::store::SnapshotStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
pub struct HealthModules {
    pub store: StoreStatus,
    pub geocoder: ModuleStatus,
}

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub kind: &'static str,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotStatus>,
}

#[derive(Debug, Serialize)]
pub struct ModuleStatus {
    pub enabled: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let count = match tokio::time::timeout(state.config.store_timeout, state.store.count()).await {
        Ok(Ok(count)) => Some(count),
        Ok(Err(err)) => {
            warn!(error = %err, "store count failed");
            None
        }
        Err(_) => {
            warn!("store count timed out");
            None
        }
    };
    let snapshot = match state.snapshot.as_ref() {
        Some(snapshot) => Some(snapshot.status().await),
        None => None,
    };
    let ready = count.is_some();

    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        modules: HealthModules {
            store: StoreStatus {
                kind: state.store.kind(),
                ready,
                count,
                snapshot,
            },
            geocoder: ModuleStatus {
                enabled: state.geocoder.is_some(),
            },
        },
    })
}
