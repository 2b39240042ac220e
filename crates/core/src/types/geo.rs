use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean earth radius (IUGG) in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Axis-aligned latitude/longitude box enclosing a search circle, used by
/// stores to prefilter rows before the exact distance check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::InvalidLocation(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::InvalidLocation(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_KM * c
    }

    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let lat_delta = (radius_km / EARTH_RADIUS_KM).to_degrees();
        let min_latitude = (self.latitude - lat_delta).max(-90.0);
        let max_latitude = (self.latitude + lat_delta).min(90.0);

        let cos_lat = self.latitude.to_radians().cos();
        let lng_delta = if cos_lat > 1e-9 {
            lat_delta / cos_lat
        } else {
            180.0
        };
        let (min_longitude, max_longitude) =
            if lng_delta >= 180.0 || self.longitude - lng_delta < -180.0 || self.longitude + lng_delta > 180.0 {
                // near a pole or across the antimeridian: keep every longitude
                (-180.0, 180.0)
            } else {
                (self.longitude - lng_delta, self.longitude + lng_delta)
            };

        BoundingBox {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }
}

impl BoundingBox {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}
