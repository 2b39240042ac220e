//! Boots the full router on an ephemeral port over a temporary snapshot.

use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use envie_core::clock::FixedClock;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::router;
use crate::wiring::build_state_with_clock;

/// Around Dijon. Evaluated on Friday 2024-06-14 at 21:00 local time (UTC+2
/// once `ENVIE_UTC_OFFSET_MINUTES=120` is applied).
pub(crate) const FIXTURE: &str = r#"[
    {
        "id": "kart-1",
        "name": "Speed Kart",
        "activities": ["karting"],
        "tags": ["🏎️ Karting|activity", "Parking|service"],
        "latitude": 47.330,
        "longitude": 5.050,
        "openingHours": {"vendredi": [{"open": "14:00", "close": "23:00"}]}
    },
    {
        "id": "bar-1",
        "name": "Le Zinc",
        "activities": ["bar"],
        "tags": ["Envie de boire un verre", "CB|payment"],
        "latitude": 47.323,
        "longitude": 5.042,
        "openingHours": {"vendredi": [{"open": "18:00", "close": "02:00"}]}
    },
    {
        "id": "pizza-1",
        "name": "Pizzeria Roma",
        "activities": ["restaurant"],
        "tags": ["🍕 Pizza|food"],
        "latitude": 47.325,
        "longitude": 5.045
    },
    {
        "id": "musee-1",
        "name": "Musée des Beaux-Arts",
        "activities": ["musee"],
        "latitude": 47.3215,
        "longitude": 5.0415,
        "openingHours": {"vendredi": [{"open": "10:00", "close": "18:00"}]}
    },
    {
        "id": "far-1",
        "name": "Kart Paris",
        "activities": ["karting"],
        "latitude": 48.85,
        "longitude": 2.35
    }
]"#;

pub(crate) const ADMIN_TOKEN: &str = "test-admin-token";

#[derive(Default)]
pub(crate) struct TestOptions {
    pub geocoder_url: Option<String>,
    pub admin_token: Option<&'static str>,
    pub cors_allow_origins: Option<&'static str>,
    pub debug_errors: bool,
    pub snapshot_max_age_secs: Option<&'static str>,
    /// Replaces the Dijon fixture.
    pub fixture: Option<&'static str>,
}

pub(crate) struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub snapshot: NamedTempFile,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub(crate) async fn spawn_app(options: TestOptions) -> TestApp {
    let mut snapshot = NamedTempFile::new().unwrap();
    snapshot
        .write_all(options.fixture.unwrap_or(FIXTURE).as_bytes())
        .unwrap();
    snapshot.flush().unwrap();

    let mut vars = HashMap::new();
    vars.insert("ENVIE_SNAPSHOT_PATH", snapshot.path().display().to_string());
    vars.insert("ENVIE_UTC_OFFSET_MINUTES", "120".to_string());
    vars.insert("ENVIE_MAX_RESULTS", "3".to_string());
    vars.insert("ENVIE_GEOCODER_URL", options.geocoder_url.unwrap_or_default());
    vars.insert("ENVIE_DEBUG_ERRORS", options.debug_errors.to_string());
    if let Some(token) = options.admin_token {
        vars.insert("ENVIE_ADMIN_TOKEN", token.to_string());
    }
    if let Some(max_age) = options.snapshot_max_age_secs {
        vars.insert("ENVIE_SNAPSHOT_MAX_AGE_SECS", max_age.to_string());
    }
    if let Some(origins) = options.cors_allow_origins {
        vars.insert("ENVIE_CORS_ALLOW_ORIGINS", origins.to_string());
    }
    let config = AppConfig::from_source(|key| vars.get(key).cloned()).unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap();
    let state = build_state_with_clock(config, Arc::new(FixedClock(now)))
        .await
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router::build(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr,
        client: reqwest::Client::new(),
        snapshot,
    }
}

/// Minimal address API: knows "Dijon" and nothing else.
pub(crate) async fn spawn_geocoder() -> String {
    async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let query = params.get("q").map(String::as_str).unwrap_or_default();
        if query.to_lowercase().contains("dijon") {
            Json(json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [5.041, 47.322]},
                    "properties": {"label": "Dijon"}
                }]
            }))
        } else {
            Json(json!({"type": "FeatureCollection", "features": []}))
        }
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/search/", get(search));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/search/")
}

/// An address whose port accepts no connection.
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/search/")
}
