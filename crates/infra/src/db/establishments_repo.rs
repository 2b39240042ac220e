use envie_core::domain::establishment::EstablishmentRecord;
use envie_core::types::geo::BoundingBox;
use sqlx::{PgPool, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstablishmentsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Approved establishments inside `bbox`, plus those without coordinates so
/// the caller can report them.
pub async fn fetch_in_bounding_box(
    pool: &PgPool,
    bbox: &BoundingBox,
) -> Result<Vec<EstablishmentRecord>, EstablishmentsRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, activities, tags, latitude, longitude, opening_hours, subscription
        FROM establishments
        WHERE status = 'approved'
          AND (
            latitude IS NULL
            OR longitude IS NULL
            OR (latitude BETWEEN $1 AND $2 AND longitude BETWEEN $3 AND $4)
          )
        ORDER BY id
        "#,
    )
    .bind(bbox.min_latitude)
    .bind(bbox.max_latitude)
    .bind(bbox.min_longitude)
    .bind(bbox.max_longitude)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("id")?;
        let opening_hours: Option<serde_json::Value> = row.try_get("opening_hours")?;
        records.push(EstablishmentRecord {
            name: row.try_get("name")?,
            activities: row.try_get("activities")?,
            tags: row.try_get("tags")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            opening_hours,
            subscription: row.try_get("subscription")?,
            id,
        });
    }
    Ok(records)
}

pub async fn count_approved(pool: &PgPool) -> Result<i64, EstablishmentsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM establishments
        WHERE status = 'approved'
        "#,
    )
    .fetch_one(pool)
    .await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}
