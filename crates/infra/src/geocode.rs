//! Free-text address resolution against a GeoJSON geocoding API
//! (`GET {base_url}?q=...&limit=1`, answering a `FeatureCollection`).

use envie_core::error::CoreError;
use envie_core::types::geo::GeoPoint;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("empty address")]
    EmptyAddress,
    #[error("invalid coordinates returned: {0}")]
    InvalidCoordinates(#[from] CoreError),
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// GeoJSON order: longitude first.
    coordinates: Vec<f64>,
}

#[derive(Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `Ok(None)` when the service knows no such address.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;
        let collection: FeatureCollection = response.json().await?;
        let point = first_point(collection)?;
        debug!(address, ?point, "address geocoded");
        Ok(point)
    }
}

fn first_point(collection: FeatureCollection) -> Result<Option<GeoPoint>, GeocodeError> {
    let Some(feature) = collection.features.into_iter().next() else {
        return Ok(None);
    };
    match feature.geometry.coordinates.as_slice() {
        [longitude, latitude, ..] => Ok(Some(GeoPoint::new(*latitude, *longitude)?)),
        _ => Err(GeocodeError::InvalidCoordinates(CoreError::InvalidLocation(
            "point needs two coordinates".to_string(),
        ))),
    }
}
