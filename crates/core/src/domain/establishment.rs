use serde::Deserialize;
use serde_json::Value;

use crate::types::geo::GeoPoint;
use crate::types::schedule::{OpeningSchedule, RawOpeningHours};
use crate::types::tag::Tag;
use crate::types::text::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionTier {
    #[default]
    Standard,
    Premium,
}

impl SubscriptionTier {
    /// Unknown or missing plans fall back to `Standard`.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_uppercase().as_str() {
            "PREMIUM" => Self::Premium,
            _ => Self::Standard,
        }
    }
}

/// An establishment as the store persists it, before ingestion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Kept as raw JSON so one malformed schedule only costs that record its
    /// hours instead of failing the whole batch.
    #[serde(default)]
    pub opening_hours: Option<Value>,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Problems found while ingesting a record. None of them drop the record.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestIssue {
    InvalidLocation(String),
    InvalidSchedule(String),
    DroppedTag(String),
}

/// Read-only view of an establishment used by the ranking pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EstablishmentCandidate {
    pub id: String,
    pub name: String,
    pub activities: Vec<String>,
    pub tags: Vec<Tag>,
    pub location: Option<GeoPoint>,
    pub schedule: Option<OpeningSchedule>,
    pub subscription: SubscriptionTier,
}

impl EstablishmentCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            activities: Vec::new(),
            tags: Vec::new(),
            location: None,
            schedule: None,
            subscription: SubscriptionTier::Standard,
        }
    }

    pub fn with_activities<I, S>(mut self, activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.activities = normalize_activities(activities);
        self
    }

    /// Tags that do not survive parsing are silently dropped.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags.into_iter().filter_map(|raw| Tag::parse(raw.as_ref())).collect();
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_schedule(mut self, schedule: OpeningSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn with_subscription(mut self, subscription: SubscriptionTier) -> Self {
        self.subscription = subscription;
        self
    }

    pub fn from_record(record: EstablishmentRecord) -> (Self, Vec<IngestIssue>) {
        let mut issues = Vec::new();

        let mut tags = Vec::with_capacity(record.tags.len());
        for raw in &record.tags {
            match Tag::parse(raw) {
                Some(tag) => tags.push(tag),
                None => issues.push(IngestIssue::DroppedTag(raw.clone())),
            }
        }

        let location = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => match GeoPoint::new(latitude, longitude) {
                Ok(point) => Some(point),
                Err(err) => {
                    issues.push(IngestIssue::InvalidLocation(err.to_string()));
                    None
                }
            },
            _ => None,
        };

        let schedule = match record.opening_hours.map(decode_schedule) {
            Some(Ok(schedule)) if !schedule.is_empty() => Some(schedule),
            Some(Ok(_)) | None => None,
            Some(Err(reason)) => {
                issues.push(IngestIssue::InvalidSchedule(reason));
                None
            }
        };

        let candidate = Self {
            activities: normalize_activities(&record.activities),
            subscription: record
                .subscription
                .as_deref()
                .map(SubscriptionTier::parse)
                .unwrap_or_default(),
            id: record.id,
            name: record.name,
            tags,
            location,
            schedule,
        };
        (candidate, issues)
    }
}

fn decode_schedule(value: Value) -> Result<OpeningSchedule, String> {
    let raw: RawOpeningHours = serde_json::from_value(value).map_err(|err| err.to_string())?;
    OpeningSchedule::from_raw(&raw).map_err(|err| err.to_string())
}

fn normalize_activities<I, S>(activities: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output: Vec<String> = Vec::new();
    for activity in activities {
        let normalized = normalize(activity.as_ref().replace('_', " ").as_str());
        if !normalized.is_empty() && !output.contains(&normalized) {
            output.push(normalized);
        }
    }
    output
}
