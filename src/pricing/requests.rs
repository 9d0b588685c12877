//! Request DTOs for quote API endpoints.

use serde::Deserialize;

use super::form::QuoteForm;

/// Request to save a labeled snapshot of the editor state.
///
/// Destination city and date range default to the program's own values
/// when omitted or blank.
#[derive(Debug, Deserialize)]
pub struct SaveSnapshotRequest {
    pub label: String,
    #[serde(default)]
    pub destination_city: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
    pub input: QuoteForm,
}
