use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::state::AppState;
use envie_infra::store::{SnapshotStatus, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum SnapshotAdminError {
    #[error("snapshot store not in use")]
    NotConfigured,
    #[error("{0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
pub struct SnapshotReloadResponse {
    action: &'static str,
    count: usize,
}

pub async fn snapshot_status(
    State(state): State<AppState>,
) -> Result<Json<SnapshotStatus>, SnapshotAdminError> {
    let snapshot = snapshot_store(&state)?;
    Ok(Json(snapshot.status().await))
}

pub async fn snapshot_reload(
    State(state): State<AppState>,
) -> Result<Json<SnapshotReloadResponse>, SnapshotAdminError> {
    let snapshot = snapshot_store(&state)?;
    let count = snapshot.reload().await?;
    info!(count, "snapshot reloaded on admin request");
    Ok(Json(SnapshotReloadResponse {
        action: "reload",
        count,
    }))
}

fn snapshot_store(state: &AppState) -> Result<&Arc<SnapshotStore>, SnapshotAdminError> {
    state.snapshot.as_ref().ok_or(SnapshotAdminError::NotConfigured)
}

impl IntoResponse for SnapshotAdminError {
    fn into_response(self) -> Response {
        let status = match self {
            SnapshotAdminError::NotConfigured => StatusCode::CONFLICT,
            SnapshotAdminError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
