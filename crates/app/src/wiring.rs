use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::{AppConfig, StoreKind};
use crate::service::SearchService;
use crate::state::AppState;
use envie_core::clock::{Clock, SystemClock};
use envie_core::error::CoreError;
use envie_core::ranking::RankingEngine;
use envie_infra::db::{connect_lazy, DbPoolError};
use envie_infra::geocode::Geocoder;
use envie_infra::store::{EstablishmentStore, PgEstablishmentStore, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("ranking config error: {0}")]
    Ranking(#[from] CoreError),
    #[error("postgres store selected but ENVIE_DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] StoreError),
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub async fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    build_state_with_clock(config, Arc::new(SystemClock)).await
}

pub async fn build_state_with_clock(
    config: AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<AppState, WiringError> {
    let engine = RankingEngine::new(config.ranking.clone())?;
    let client = Client::builder().timeout(config.request_timeout).build()?;

    let mut snapshot = None;
    let mut db = None;
    let store: Arc<dyn EstablishmentStore> = match config.store {
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(WiringError::MissingDatabaseUrl)?;
            let pool = connect_lazy(url, config.db_max_connections)?;
            db = Some(pool.clone());
            Arc::new(PgEstablishmentStore::new(pool))
        }
        StoreKind::Snapshot => {
            let store = Arc::new(SnapshotStore::open(&config.snapshot_path, config.snapshot_max_age).await?);
            snapshot = Some(Arc::clone(&store));
            store
        }
    };

    let geocoder = config
        .geocoder_url
        .as_ref()
        .map(|url| Geocoder::new(client.clone(), url.clone()));
    let search = SearchService::new(engine, Arc::clone(&store), clock, config.store_timeout);

    Ok(AppState {
        config: Arc::new(config),
        search: Arc::new(search),
        store,
        snapshot,
        db,
        geocoder,
    })
}
