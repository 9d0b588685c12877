//! Database queries for quote snapshots.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{NewSnapshot, QuoteSnapshot, SnapshotSummary};

/// Insert a new labeled snapshot. Earlier snapshots are never touched.
pub async fn insert_snapshot(
    pool: &PgPool,
    snapshot: &NewSnapshot,
) -> Result<QuoteSnapshot, AppError> {
    let saved = sqlx::query_as::<_, QuoteSnapshot>(
        r#"
        INSERT INTO program_quote_snapshots (
            id, program_id, label, destination_city, date_range,
            input_state, single_price, double_price, summary
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING
            id, program_id, label, destination_city, date_range,
            input_state, single_price, double_price, summary, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(snapshot.program_id)
    .bind(&snapshot.label)
    .bind(&snapshot.destination_city)
    .bind(&snapshot.date_range)
    .bind(&snapshot.input_state)
    .bind(snapshot.single_price)
    .bind(snapshot.double_price)
    .bind(&snapshot.summary)
    .fetch_one(pool)
    .await?;

    Ok(saved)
}

/// Get a snapshot by id
pub async fn get_snapshot(pool: &PgPool, snapshot_id: Uuid) -> Result<QuoteSnapshot, AppError> {
    sqlx::query_as::<_, QuoteSnapshot>(
        r#"
        SELECT
            id, program_id, label, destination_city, date_range,
            input_state, single_price, double_price, summary, created_at
        FROM program_quote_snapshots
        WHERE id = $1
        "#,
    )
    .bind(snapshot_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// List a program's snapshots, newest first
pub async fn list_snapshots(
    pool: &PgPool,
    program_id: Uuid,
) -> Result<Vec<SnapshotSummary>, AppError> {
    let snapshots = sqlx::query_as::<_, SnapshotSummary>(
        r#"
        SELECT id, label, single_price, double_price, created_at
        FROM program_quote_snapshots
        WHERE program_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(program_id)
    .fetch_all(pool)
    .await?;

    Ok(snapshots)
}
