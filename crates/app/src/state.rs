use std::sync::Arc;

use crate::config::AppConfig;
use crate::service::SearchService;
use envie_infra::db::DbPool;
use envie_infra::geocode::Geocoder;
use envie_infra::store::{EstablishmentStore, SnapshotStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub search: Arc<SearchService>,
    pub store: Arc<dyn EstablishmentStore>,
    pub snapshot: Option<Arc<SnapshotStore>>,
    pub db: Option<DbPool>,
    pub geocoder: Option<Geocoder>,
}
