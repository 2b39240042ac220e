use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::service::SearchError;
use crate::state::AppState;
use envie_core::domain::search::{ScoredResult, SearchQuery};
use envie_core::error::CoreError;
use envie_core::types::geo::GeoPoint;
use envie_infra::geocode::GeocodeError;

/// Everything arrives as text so that a malformed number yields our own 400
/// body instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub envie: Option<String>,
    pub rayon: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub limit: Option<String>,
    pub adresse: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub results: Vec<SearchResultBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultBody {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub thematic_score: f64,
    pub distance: f64,
    pub is_open: bool,
    pub activities: Vec<String>,
    pub matched_tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("missing parameter: {0}")]
    MissingParam(&'static str),
    #[error("invalid parameter {0}: {1}")]
    InvalidParam(&'static str, String),
    #[error("{0}")]
    Invalid(#[from] CoreError),
    #[error("address not found: {0}")]
    AddressNotFound(String),
    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("{0}")]
    Search(SearchError),
}

impl From<SearchError> for SearchApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Invalid(err) => SearchApiError::Invalid(err),
            other => SearchApiError::Search(other),
        }
    }
}

/// Error paired with the exposure policy in force for the request.
#[derive(Debug)]
pub struct SearchFailure {
    error: SearchApiError,
    expose_details: bool,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, SearchFailure> {
    run(&state, params)
        .await
        .map(Json)
        .map_err(|error| SearchFailure {
            error,
            expose_details: state.config.debug_errors,
        })
}

async fn run(state: &AppState, params: SearchParams) -> Result<SearchResponse, SearchApiError> {
    let envie = params
        .envie
        .filter(|value| !value.trim().is_empty())
        .ok_or(SearchApiError::MissingParam("envie"))?;
    let radius_km = parse_radius(params.rayon.as_deref())?;
    let limit = parse_limit(params.limit.as_deref())?.map(|limit| limit.min(state.config.max_results));
    let origin = resolve_origin(state, params.lat, params.lng, params.adresse).await?;

    let query = SearchQuery::new(&envie, radius_km, origin)?.with_limit(limit);
    debug!(envie = %query.envie, radius_km, ?limit, "envie search requested");
    let outcome = state.search.search(&query).await?;

    Ok(SearchResponse {
        total: outcome.total,
        results: outcome.results.iter().map(result_body).collect(),
    })
}

fn parse_radius(raw: Option<&str>) -> Result<f64, SearchApiError> {
    let raw = raw.ok_or(SearchApiError::MissingParam("rayon"))?;
    let radius: f64 = parse_number("rayon", raw)?;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SearchApiError::InvalidParam(
            "rayon",
            "must be a positive number of kilometres".to_string(),
        ));
    }
    Ok(radius)
}

fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, SearchApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_number("limit", value).map(Some),
        None => Ok(None),
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, SearchApiError> {
    raw.trim()
        .parse()
        .map_err(|_| SearchApiError::InvalidParam(name, format!("{raw:?} is not a number")))
}

async fn resolve_origin(
    state: &AppState,
    lat: Option<String>,
    lng: Option<String>,
    adresse: Option<String>,
) -> Result<GeoPoint, SearchApiError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => {
            let latitude = parse_number("lat", &lat)?;
            let longitude = parse_number("lng", &lng)?;
            Ok(GeoPoint::new(latitude, longitude)?)
        }
        (Some(_), None) => Err(SearchApiError::MissingParam("lng")),
        (None, Some(_)) => Err(SearchApiError::MissingParam("lat")),
        (None, None) => {
            let address = adresse
                .filter(|value| !value.trim().is_empty())
                .ok_or(SearchApiError::MissingParam("lat/lng or adresse"))?;
            let geocoder = state
                .geocoder
                .as_ref()
                .ok_or(SearchApiError::MissingParam("lat/lng"))?;
            geocoder
                .geocode(&address)
                .await?
                .ok_or(SearchApiError::AddressNotFound(address))
        }
    }
}

fn result_body(result: &ScoredResult) -> SearchResultBody {
    let establishment = &result.establishment;
    SearchResultBody {
        id: establishment.id.clone(),
        name: establishment.name.clone(),
        score: round3(result.total_score),
        thematic_score: round3(result.thematic_score),
        distance: round3(result.distance_km),
        is_open: result.is_open,
        activities: establishment.activities.clone(),
        matched_tags: result.matched_tags.clone(),
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl SearchApiError {
    fn status(&self) -> StatusCode {
        match self {
            SearchApiError::MissingParam(_)
            | SearchApiError::InvalidParam(..)
            | SearchApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            SearchApiError::AddressNotFound(_) => StatusCode::NOT_FOUND,
            SearchApiError::Geocode(GeocodeError::EmptyAddress) => StatusCode::BAD_REQUEST,
            SearchApiError::Geocode(_) => StatusCode::BAD_GATEWAY,
            SearchApiError::Search(SearchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            SearchApiError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors always carry their message; upstream failures only
    /// when details are exposed.
    fn public_message(&self, expose_details: bool) -> String {
        if expose_details || self.status().is_client_error() {
            return self.to_string();
        }
        match self.status() {
            StatusCode::BAD_GATEWAY => "geocoding service unavailable".to_string(),
            StatusCode::GATEWAY_TIMEOUT => "search timed out".to_string(),
            _ => "search temporarily unavailable".to_string(),
        }
    }
}

impl IntoResponse for SearchFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            error!(error = %self.error, status = status.as_u16(), "envie search failed");
        } else {
            warn!(error = %self.error, status = status.as_u16(), "envie search rejected");
        }
        let body = Json(ErrorBody {
            error: self.error.public_message(self.expose_details),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::*;
    use crate::http::test_support::{spawn_app, spawn_geocoder, unreachable_url, TestApp, TestOptions};
    use envie_infra::store::StoreError;

    const DIJON: [(&str, &str); 2] = [("lat", "47.322"), ("lng", "5.041")];

    async fn get(app: &TestApp, params: &[(&str, &str)]) -> (u16, Value) {
        let response = app
            .client
            .get(app.url("/api/recherche/envie"))
            .query(params)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    fn ids(body: &Value) -> Vec<&str> {
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|result| result["id"].as_str().unwrap())
            .collect()
    }

    fn with_origin<'a>(params: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        params.iter().copied().chain(DIJON).collect()
    }

    #[test]
    fn round3_keeps_three_decimals() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(0.0), 0.0);
        assert_eq!(round3(10.0004), 10.0);
    }

    #[test]
    fn radius_must_be_positive_number() {
        assert_eq!(parse_radius(Some(" 2.5 ")).unwrap(), 2.5);
        assert!(matches!(parse_radius(None), Err(SearchApiError::MissingParam("rayon"))));
        assert!(matches!(parse_radius(Some("loin")), Err(SearchApiError::InvalidParam("rayon", _))));
        assert!(matches!(parse_radius(Some("0")), Err(SearchApiError::InvalidParam("rayon", _))));
        assert!(matches!(parse_radius(Some("NaN")), Err(SearchApiError::InvalidParam("rayon", _))));
    }

    #[test]
    fn limit_is_optional() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some("")).unwrap(), None);
        assert_eq!(parse_limit(Some("2")).unwrap(), Some(2));
        assert!(parse_limit(Some("-1")).is_err());
    }

    #[test]
    fn upstream_details_are_hidden_by_default() {
        let error = SearchApiError::Search(SearchError::Upstream(StoreError::Stale { age_secs: 42 }));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.public_message(false), "search temporarily unavailable");
        assert!(error.public_message(true).contains("42"));

        let timeout = SearchApiError::Search(SearchError::Timeout(Duration::from_millis(5)));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.public_message(false), "search timed out");

        let invalid = SearchApiError::MissingParam("envie");
        assert_eq!(invalid.public_message(false), "missing parameter: envie");
    }

    #[tokio::test]
    async fn karting_comes_first() {
        let app = spawn_app(TestOptions::default()).await;
        let (status, body) = get(&app, &with_origin(&[("envie", "faire du karting"), ("rayon", "10")])).await;
        assert_eq!(status, 200);
        assert_eq!(body["total"], 4);
        let first = &body["results"][0];
        assert_eq!(first["id"], "kart-1");
        assert_eq!(first["isOpen"], true);
        assert!(first["thematicScore"].as_f64().unwrap() > 0.0);
        assert!(first["distance"].as_f64().unwrap() <= 10.0);
        assert_eq!(first["activities"], json!(["karting"]));
        assert!(first.get("matchedTags").is_some());
        assert!(!ids(&body).contains(&"far-1"));
    }

    #[tokio::test]
    async fn irrelevant_establishments_stay_behind_relevant_ones() {
        let app = spawn_app(TestOptions::default()).await;
        let (_, body) = get(&app, &with_origin(&[("envie", "boire un verre"), ("rayon", "10")])).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results[0]["id"], "bar-1");
        let mut seen_irrelevant = false;
        for result in results {
            let relevant = result["thematicScore"].as_f64().unwrap() > 0.0;
            assert!(!(seen_irrelevant && relevant), "relevant result after an irrelevant one");
            seen_irrelevant |= !relevant;
        }
        let scores: Vec<f64> = results.iter().map(|r| r["score"].as_f64().unwrap()).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn mixed_intent_matches_both_activities() {
        let app = spawn_app(TestOptions::default()).await;
        let (status, body) = get(&app, &with_origin(&[("envie", "karting et pizza"), ("rayon", "10")])).await;
        assert_eq!(status, 200);
        let mut top: Vec<&str> = ids(&body).into_iter().take(2).collect();
        top.sort_unstable();
        assert_eq!(top, vec!["kart-1", "pizza-1"]);
    }

    #[tokio::test]
    async fn limit_is_clamped_and_total_is_kept() {
        let app = spawn_app(TestOptions::default()).await;
        let (_, body) = get(&app, &with_origin(&[("envie", "karting"), ("rayon", "10"), ("limit", "1")])).await;
        assert_eq!(body["total"], 4);
        assert_eq!(ids(&body), vec!["kart-1"]);

        let (_, body) = get(&app, &with_origin(&[("envie", "karting"), ("rayon", "10"), ("limit", "50")])).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn nothing_nearby_returns_empty_list() {
        let app = spawn_app(TestOptions::default()).await;
        let (status, body) = get(
            &app,
            &[("envie", "karting"), ("rayon", "5"), ("lat", "43.6045"), ("lng", "1.4440")],
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"total": 0, "results": []}));
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let app = spawn_app(TestOptions::default()).await;
        let params = with_origin(&[("envie", "sortir boire un verre"), ("rayon", "10")]);
        let (_, first) = get(&app, &params).await;
        let (_, second) = get(&app, &params).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn equal_displayed_scores_are_ordered_by_id() {
        const NEIGHBOURS: &str = r#"[
            {"id": "b", "name": "Kart B", "activities": ["karting"], "latitude": 47.322, "longitude": 5.041},
            {"id": "a", "name": "Kart A", "activities": ["karting"], "latitude": 47.3220135, "longitude": 5.041}
        ]"#;
        let app = spawn_app(TestOptions {
            fixture: Some(NEIGHBOURS),
            ..TestOptions::default()
        })
        .await;
        let (status, body) = get(&app, &with_origin(&[("envie", "karting"), ("rayon", "10")])).await;
        assert_eq!(status, 200);
        assert_eq!(ids(&body), vec!["a", "b"]);
        assert_eq!(body["results"][0]["score"], body["results"][1]["score"]);
    }

    #[tokio::test]
    async fn missing_or_invalid_params_are_400() {
        let app = spawn_app(TestOptions::default()).await;
        let cases: Vec<Vec<(&str, &str)>> = vec![
            with_origin(&[("rayon", "10")]),
            with_origin(&[("envie", "   "), ("rayon", "10")]),
            with_origin(&[("envie", "karting")]),
            with_origin(&[("envie", "karting"), ("rayon", "dix")]),
            with_origin(&[("envie", "karting"), ("rayon", "0")]),
            vec![("envie", "karting"), ("rayon", "10"), ("lat", "47.3")],
            vec![("envie", "karting"), ("rayon", "10"), ("lat", "120"), ("lng", "5.0")],
            vec![("envie", "karting"), ("rayon", "10")],
        ];
        for params in cases {
            let (status, body) = get(&app, &params).await;
            assert_eq!(status, 400, "params {params:?}");
            assert!(body["error"].is_string(), "params {params:?}");
        }
    }

    #[tokio::test]
    async fn address_is_geocoded() {
        let geocoder_url = spawn_geocoder().await;
        let app = spawn_app(TestOptions {
            geocoder_url: Some(geocoder_url),
            ..TestOptions::default()
        })
        .await;
        let (status, body) = get(&app, &[("envie", "karting"), ("rayon", "10"), ("adresse", "Place Darcy, Dijon")]).await;
        assert_eq!(status, 200);
        assert_eq!(body["results"][0]["id"], "kart-1");

        let (status, body) = get(&app, &[("envie", "karting"), ("rayon", "10"), ("adresse", "Nulle part")]).await;
        assert_eq!(status, 404);
        assert!(body["error"].as_str().unwrap().contains("Nulle part"));
    }

    #[tokio::test]
    async fn geocoder_outage_is_502() {
        let app = spawn_app(TestOptions {
            geocoder_url: Some(unreachable_url().await),
            ..TestOptions::default()
        })
        .await;
        let (status, body) = get(&app, &[("envie", "karting"), ("rayon", "10"), ("adresse", "Dijon")]).await;
        assert_eq!(status, 502);
        assert_eq!(body["error"], "geocoding service unavailable");
    }

    #[tokio::test]
    async fn store_failure_is_500_without_details() {
        let app = spawn_app(TestOptions {
            snapshot_max_age_secs: Some("0"),
            ..TestOptions::default()
        })
        .await;
        std::fs::remove_file(app.snapshot.path()).unwrap();
        let (status, body) = get(&app, &with_origin(&[("envie", "karting"), ("rayon", "10")])).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "search temporarily unavailable"}));
    }

    #[tokio::test]
    async fn debug_errors_expose_store_failure() {
        let app = spawn_app(TestOptions {
            snapshot_max_age_secs: Some("0"),
            debug_errors: true,
            ..TestOptions::default()
        })
        .await;
        std::fs::remove_file(app.snapshot.path()).unwrap();
        let (status, body) = get(&app, &with_origin(&[("envie", "karting"), ("rayon", "10")])).await;
        assert_eq!(status, 500);
        assert!(body["error"].as_str().unwrap().contains("stale"));
    }
}
