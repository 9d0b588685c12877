//! Database models for saved quote snapshots.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::form::QuoteForm;

/// Snapshot from program_quote_snapshots
#[derive(Debug, Clone, FromRow)]
pub struct QuoteSnapshot {
    pub id: Uuid,
    pub program_id: Uuid,
    pub label: String,
    pub destination_city: String,
    pub date_range: String,
    pub input_state: serde_json::Value,
    pub single_price: Decimal,
    pub double_price: Decimal,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl QuoteSnapshot {
    /// Restore the editor state this snapshot was taken from
    pub fn form(&self) -> Result<QuoteForm, serde_json::Error> {
        serde_json::from_value(self.input_state.clone())
    }
}

/// Listing row for a program's snapshots (no input state)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SnapshotSummary {
    pub id: Uuid,
    pub label: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub single_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub double_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Values written by a save
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub program_id: Uuid,
    pub label: String,
    pub destination_city: String,
    pub date_range: String,
    pub input_state: serde_json::Value,
    pub single_price: Decimal,
    pub double_price: Decimal,
    pub summary: String,
}
