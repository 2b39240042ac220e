use chrono::NaiveDateTime;

use crate::domain::establishment::EstablishmentCandidate;
use crate::domain::search::PartialDataWarning;
use crate::types::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Availability {
    pub distance_km: f64,
    pub is_open: bool,
}

/// The radius is a hard boundary, inclusive, with no special case for zero.
pub fn within_radius(distance_km: f64, radius_km: f64) -> bool {
    distance_km <= radius_km
}

/// Attaches distance and opening state to a candidate, or returns `None` when
/// it lies outside the radius or has no location.
pub fn compose(
    candidate: &EstablishmentCandidate,
    origin: &GeoPoint,
    radius_km: f64,
    local_now: NaiveDateTime,
    warnings: &mut Vec<PartialDataWarning>,
) -> Option<Availability> {
    let Some(location) = candidate.location else {
        warnings.push(PartialDataWarning::MissingLocation {
            id: candidate.id.clone(),
        });
        return None;
    };
    let distance_km = origin.distance_km(&location);
    if !within_radius(distance_km, radius_km) {
        return None;
    }
    let is_open = match &candidate.schedule {
        Some(schedule) => schedule.is_open_at(local_now),
        None => {
            warnings.push(PartialDataWarning::MissingSchedule {
                id: candidate.id.clone(),
            });
            false
        }
    };
    Some(Availability {
        distance_km,
        is_open,
    })
}
