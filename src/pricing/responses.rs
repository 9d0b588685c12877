//! Response DTOs for quote API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{round_money, QuoteResult};
use super::form::QuoteForm;
use super::inputs::Occupancy;
use super::models::SnapshotSummary;

/// Shown when any tier is priced without the bank commission, either because
/// the rate is 1 or more or because the grossed-up price is too large
pub const COMMISSION_SKIPPED_WARNING: &str = "Bank commission was not applied: the rate must be \
     below 1 and the resulting price must not be too large. Prices are shown without commission";

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    /// Rounded to cents for display
    pub fn cents(amount: Decimal, currency: &str) -> Self {
        let mut amount = round_money(amount, 2);
        amount.rescale(2);
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// One occupancy tier of a quote
#[derive(Debug, Serialize)]
pub struct TierResponse {
    pub occupancy: Occupancy,
    pub occupants: u32,
    pub price: MoneyResponse,
    pub financed_total: MoneyResponse,
    pub installment_amount: MoneyResponse,
}

/// Response for a quote recompute
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub fixed_cost_per_person: MoneyResponse,
    pub variable_cost_per_person: MoneyResponse,
    pub tiers: Vec<TierResponse>,
    pub installment_count: i32,
    pub commission_applied: bool,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl QuoteResponse {
    pub fn from_result(result: &QuoteResult, currency: &str) -> Self {
        let tiers = result
            .tiers
            .iter()
            .map(|tier| TierResponse {
                occupancy: tier.price.occupancy,
                occupants: tier.price.occupancy.occupants(),
                price: MoneyResponse::cents(tier.price.gross_price, currency),
                financed_total: MoneyResponse::cents(tier.financing.financed_total, currency),
                installment_amount: MoneyResponse::cents(
                    tier.financing.installment_amount,
                    currency,
                ),
            })
            .collect();

        let mut warnings = Vec::new();
        if !result.commission_applied {
            warnings.push(COMMISSION_SKIPPED_WARNING.to_string());
        }

        Self {
            fixed_cost_per_person: MoneyResponse::cents(result.breakdown.fixed_per_person, currency),
            variable_cost_per_person: MoneyResponse::cents(
                result.breakdown.variable_per_person,
                currency,
            ),
            tiers,
            installment_count: result.installment_count,
            commission_applied: result.commission_applied,
            summary: result.summary.clone(),
            warnings,
        }
    }
}

/// Response for a snapshot save
#[derive(Debug, Serialize)]
pub struct SaveSnapshotResponse {
    pub success: bool,
    pub snapshot_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Response for a program's snapshot listing
#[derive(Debug, Serialize)]
pub struct SnapshotListResponse {
    pub program_id: Uuid,
    pub snapshots: Vec<SnapshotSummary>,
}

/// Response for a single snapshot, with its quote recomputed
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub id: Uuid,
    pub program_id: Uuid,
    pub label: String,
    pub destination_city: String,
    pub date_range: String,
    pub input: QuoteForm,
    pub quote: QuoteResponse,
    pub created_at: DateTime<Utc>,
}

/// Generic quote error response
#[derive(Debug, Serialize)]
pub struct QuoteErrorResponse {
    pub success: bool,
    pub error_type: String,
    pub message: String,
}
