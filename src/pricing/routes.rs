//! JSON API for quote calculation and snapshots.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::AppState;

use super::form::QuoteForm;
use super::requests::SaveSnapshotRequest;
use super::responses::{
    QuoteErrorResponse, QuoteResponse, SaveSnapshotResponse, SnapshotListResponse,
    SnapshotResponse,
};
use super::services::{self, QuoteError};

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        let status = match &self {
            QuoteError::ProgramNotFound { .. } | QuoteError::SnapshotNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            QuoteError::InvalidRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            QuoteError::InvalidSnapshot { .. } | QuoteError::Persistence(_) => {
                tracing::error!("Quote API error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = QuoteErrorResponse {
            success: false,
            error_type: self.error_type().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Routes mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quotes/calculate", post(calculate))
        .route("/quotes/:snapshot_id", get(get_snapshot))
        .route(
            "/programs/:program_id/quotes",
            get(list_snapshots).post(save_snapshot),
        )
}

/// POST /api/quotes/calculate
async fn calculate(
    State(state): State<AppState>,
    Json(form): Json<QuoteForm>,
) -> Json<QuoteResponse> {
    let result = services::calculate(&form);
    Json(QuoteResponse::from_result(&result, &state.config.currency))
}

/// POST /api/programs/:program_id/quotes
async fn save_snapshot(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
    Json(request): Json<SaveSnapshotRequest>,
) -> Result<(StatusCode, Json<SaveSnapshotResponse>), QuoteError> {
    let saved = services::save_snapshot(&state.db, &state.cache, program_id, &request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveSnapshotResponse {
            success: true,
            snapshot_id: saved.id,
            created_at: saved.created_at,
        }),
    ))
}

/// GET /api/programs/:program_id/quotes
async fn list_snapshots(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> Result<Json<SnapshotListResponse>, QuoteError> {
    let snapshots = services::list_snapshots(&state.db, &state.cache, program_id).await?;

    Ok(Json(SnapshotListResponse {
        program_id,
        snapshots: snapshots.as_ref().clone(),
    }))
}

/// GET /api/quotes/:snapshot_id
async fn get_snapshot(
    State(state): State<AppState>,
    Path(snapshot_id): Path<Uuid>,
) -> Result<Json<SnapshotResponse>, QuoteError> {
    let (snapshot, form, result) = services::load_snapshot(&state.db, snapshot_id).await?;

    Ok(Json(SnapshotResponse {
        id: snapshot.id,
        program_id: snapshot.program_id,
        label: snapshot.label,
        destination_city: snapshot.destination_city,
        date_range: snapshot.date_range,
        input: form,
        quote: QuoteResponse::from_result(&result, &state.config.currency),
        created_at: snapshot.created_at,
    }))
}
