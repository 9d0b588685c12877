//! Quote service functions with database access.
//!
//! The calculators stay pure; these functions add program lookup, snapshot
//! persistence and caching around them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::db;
use crate::error::AppError;
use crate::models::Program;

use super::calculators::{compute_quote, round_money, QuoteResult};
use super::form::QuoteForm;
use super::models::{NewSnapshot, QuoteSnapshot, SnapshotSummary};
use super::queries;
use super::requests::SaveSnapshotRequest;

/// Longest accepted snapshot label
const MAX_LABEL_LEN: usize = 120;

/// Largest price the NUMERIC(14, 2) snapshot columns can hold
const MAX_SNAPSHOT_PRICE: Decimal = dec!(999999999999.99);

/// Quote service error types
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Program {program_id} not found")]
    ProgramNotFound { program_id: Uuid },

    #[error("Quote snapshot {snapshot_id} not found")]
    SnapshotNotFound { snapshot_id: Uuid },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Snapshot {snapshot_id} has unreadable input state: {message}")]
    InvalidSnapshot { snapshot_id: Uuid, message: String },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl QuoteError {
    pub fn error_type(&self) -> &'static str {
        match self {
            QuoteError::ProgramNotFound { .. } => "program_not_found",
            QuoteError::SnapshotNotFound { .. } => "snapshot_not_found",
            QuoteError::InvalidRequest { .. } => "invalid_request",
            QuoteError::InvalidSnapshot { .. } => "invalid_snapshot",
            QuoteError::Persistence(_) => "persistence_error",
        }
    }
}

impl From<AppError> for QuoteError {
    fn from(err: AppError) -> Self {
        QuoteError::Persistence(err.to_string())
    }
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::ProgramNotFound { .. } | QuoteError::SnapshotNotFound { .. } => {
                AppError::NotFound
            }
            QuoteError::InvalidRequest { message } => AppError::InvalidInput(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Recompute a quote from the editor's typed values
pub fn calculate(form: &QuoteForm) -> QuoteResult {
    compute_quote(&form.to_input())
}

/// Look up a program, preferring the cache
pub async fn get_program(
    pool: &PgPool,
    cache: &AppCache,
    program_id: Uuid,
) -> Result<Arc<Program>, QuoteError> {
    if let Some(cached) = cache.programs.get(&program_id).await {
        tracing::debug!("Cache HIT for program: {}", program_id);
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for program: {}", program_id);
    let program = match db::get_program(pool, program_id).await {
        Ok(program) => Arc::new(program),
        Err(AppError::NotFound) => return Err(QuoteError::ProgramNotFound { program_id }),
        Err(e) => return Err(e.into()),
    };
    cache.programs.insert(program_id, program.clone()).await;

    Ok(program)
}

/// Pick the caller's value unless it is missing or blank
fn non_blank_or(value: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback(),
    }
}

/// Build the row written for a save request.
///
/// Prices and summary are recomputed from `request.input`, so the stored
/// prices always agree with the stored input state.
pub fn prepare_snapshot(
    program: &Program,
    request: &SaveSnapshotRequest,
) -> Result<NewSnapshot, QuoteError> {
    let label = request.label.trim();
    if label.is_empty() {
        return Err(QuoteError::InvalidRequest {
            message: "Snapshot label is required".to_string(),
        });
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(QuoteError::InvalidRequest {
            message: format!("Snapshot label must be at most {} characters", MAX_LABEL_LEN),
        });
    }

    let result = calculate(&request.input);
    let single_price = snapshot_price(result.single_price())?;
    let double_price = snapshot_price(result.double_price())?;
    let input_state = serde_json::to_value(&request.input)
        .map_err(|e| QuoteError::Persistence(e.to_string()))?;

    Ok(NewSnapshot {
        program_id: program.id,
        label: label.to_string(),
        destination_city: non_blank_or(request.destination_city.as_deref(), || {
            program.destination_city.clone()
        }),
        date_range: non_blank_or(request.date_range.as_deref(), || program.date_range()),
        input_state,
        single_price,
        double_price,
        summary: result.summary,
    })
}

/// Stored prices are cents, matching the NUMERIC(14, 2) columns
fn snapshot_price(amount: Decimal) -> Result<Decimal, QuoteError> {
    let price = round_money(amount, 2);
    if price.abs() > MAX_SNAPSHOT_PRICE {
        return Err(QuoteError::InvalidRequest {
            message: format!(
                "Quote price {} is too large to save; the limit is {}",
                price, MAX_SNAPSHOT_PRICE
            ),
        });
    }
    Ok(price)
}

/// Save a new labeled snapshot for a program.
///
/// Saving never modifies earlier snapshots. On failure nothing is written.
pub async fn save_snapshot(
    pool: &PgPool,
    cache: &AppCache,
    program_id: Uuid,
    request: &SaveSnapshotRequest,
) -> Result<QuoteSnapshot, QuoteError> {
    let program = get_program(pool, cache, program_id).await?;
    let snapshot = prepare_snapshot(&program, request)?;

    let saved = queries::insert_snapshot(pool, &snapshot).await.map_err(|e| {
        tracing::error!("Failed to save quote snapshot for program {}: {}", program_id, e);
        QuoteError::from(e)
    })?;

    cache.invalidate_snapshots(program_id).await;
    tracing::info!(
        "Saved quote snapshot {} ({}) for program {}",
        saved.id,
        saved.label,
        program_id
    );

    Ok(saved)
}

/// List a program's snapshots, newest first
pub async fn list_snapshots(
    pool: &PgPool,
    cache: &AppCache,
    program_id: Uuid,
) -> Result<Arc<Vec<SnapshotSummary>>, QuoteError> {
    if let Some(cached) = cache.snapshot_listings.get(&program_id).await {
        tracing::debug!("Cache HIT for snapshot listing: {}", program_id);
        return Ok(cached);
    }

    // Unknown programs are a 404, not an empty list
    get_program(pool, cache, program_id).await?;

    let generation = cache.snapshot_generation();
    let snapshots = Arc::new(queries::list_snapshots(pool, program_id).await?);
    if !cache
        .cache_snapshot_listing(program_id, snapshots.clone(), generation)
        .await
    {
        tracing::debug!("Snapshot listing for {} changed while loading", program_id);
    }

    Ok(snapshots)
}

/// Load a snapshot and recompute its quote from the stored input state
pub async fn load_snapshot(
    pool: &PgPool,
    snapshot_id: Uuid,
) -> Result<(QuoteSnapshot, QuoteForm, QuoteResult), QuoteError> {
    let snapshot = match queries::get_snapshot(pool, snapshot_id).await {
        Ok(snapshot) => snapshot,
        Err(AppError::NotFound) => return Err(QuoteError::SnapshotNotFound { snapshot_id }),
        Err(e) => return Err(e.into()),
    };

    let form = snapshot.form().map_err(|e| QuoteError::InvalidSnapshot {
        snapshot_id,
        message: e.to_string(),
    })?;
    let result = calculate(&form);

    Ok((snapshot, form, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn program() -> Program {
        Program {
            id: Uuid::new_v4(),
            name: "Spring in Rome".to_string(),
            destination_city: "Rome".to_string(),
            start_date: NaiveDate::from_ymd_opt(2027, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2027, 3, 15),
            active: true,
            created_at: Utc::now(),
        }
    }

    fn request(label: &str) -> SaveSnapshotRequest {
        SaveSnapshotRequest {
            label: label.to_string(),
            destination_city: None,
            date_range: None,
            input: QuoteForm {
                nights: "5".to_string(),
                total_days: "6".to_string(),
                min_participants: "10".to_string(),
                agency_staff_count: "1".to_string(),
                room_cost_per_night: "120".to_string(),
                flight_cost_per_person: "500".to_string(),
                agency_per_diem: "100".to_string(),
                insurance_per_person: "40".to_string(),
                fee_per_person: "500".to_string(),
                bank_commission_rate: "0.04".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_quote_error_display() {
        let id = Uuid::nil();
        let err = QuoteError::ProgramNotFound { program_id: id };
        assert!(err.to_string().contains(&id.to_string()));
        assert_eq!(err.error_type(), "program_not_found");

        let err = QuoteError::InvalidRequest {
            message: "label missing".to_string(),
        };
        assert!(err.to_string().contains("label missing"));
    }

    #[test]
    fn test_prepare_snapshot_uses_program_defaults() {
        let program = program();
        let snapshot = prepare_snapshot(&program, &request("  Draft A  ")).unwrap();

        assert_eq!(snapshot.program_id, program.id);
        assert_eq!(snapshot.label, "Draft A");
        assert_eq!(snapshot.destination_city, "Rome");
        assert_eq!(snapshot.date_range, "Mar 10, 2027 to Mar 15, 2027");
        assert_eq!(snapshot.single_price, dec!(2000));
        assert_eq!(snapshot.double_price, dec!(1687.50));
        assert!(snapshot.summary.starts_with("Price includes"));
        assert_eq!(snapshot.input_state["nights"], "5");
    }

    #[test]
    fn test_prepare_snapshot_prefers_request_values() {
        let mut req = request("Final");
        req.destination_city = Some("Florence".to_string());
        req.date_range = Some("   ".to_string());

        let snapshot = prepare_snapshot(&program(), &req).unwrap();
        assert_eq!(snapshot.destination_city, "Florence");
        assert_eq!(snapshot.date_range, "Mar 10, 2027 to Mar 15, 2027");
    }

    #[test]
    fn test_prepare_snapshot_rejects_bad_labels() {
        let err = prepare_snapshot(&program(), &request("   ")).unwrap_err();
        assert_eq!(err.error_type(), "invalid_request");

        let long = "x".repeat(MAX_LABEL_LEN + 1);
        assert!(prepare_snapshot(&program(), &request(&long)).is_err());
    }

    #[test]
    fn test_prepare_snapshot_rejects_prices_too_large_to_store() {
        let mut req = request("Huge");
        req.input.fee_per_person = "1000000000000".to_string();

        let err = prepare_snapshot(&program(), &req).unwrap_err();
        assert_eq!(err.error_type(), "invalid_request");
        assert!(err.to_string().contains("too large to save"));

        req.input.fee_per_person = "500".to_string();
        assert!(prepare_snapshot(&program(), &req).is_ok());
    }

    #[test]
    fn test_snapshot_input_state_round_trips_to_same_quote() {
        let req = request("Draft");
        let snapshot = prepare_snapshot(&program(), &req).unwrap();

        let restored: QuoteForm = serde_json::from_value(snapshot.input_state).unwrap();
        assert_eq!(restored, req.input);
        assert_eq!(calculate(&restored), calculate(&req.input));
    }
}
