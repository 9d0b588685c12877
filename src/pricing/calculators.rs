//! Core pricing calculation functions.
//!
//! Pure functions for quote math - no database access. A quote is always
//! recomputed as a whole from its [`QuoteInput`].

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::inputs::{AuxiliaryLineItem, Occupancy, QuoteCosts, QuoteInput, QuoteParameters};
use super::summary::build_summary;

/// Markup applied to the listed price when it is paid in installments
pub const FINANCING_MARKUP: Decimal = dec!(1.05);

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use studytrip_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(590.625), 2), dec!(590.62));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Headcount used to prorate group costs. Never below one.
fn guaranteed_headcount(params: &QuoteParameters) -> Decimal {
    Decimal::from(params.min_participants.max(1))
}

fn lodging_total(params: &QuoteParameters, costs: &QuoteCosts) -> Decimal {
    Decimal::from(params.nights).saturating_mul(costs.room_cost_per_night)
}

/// Sum of terms that clamps at the `Decimal` range instead of panicking
fn saturating_sum(terms: impl IntoIterator<Item = Decimal>) -> Decimal {
    terms
        .into_iter()
        .fold(Decimal::ZERO, |acc, term| acc.saturating_add(term))
}

/// Per-person cost intermediates shared by every occupancy tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// Staff and professor trip costs spread over the guaranteed headcount
    pub fixed_per_person: Decimal,
    pub variable_per_person: Decimal,
}

/// Derive the fixed and variable per-person costs.
///
/// Agency staff and the accompanying professor travel free; their flights,
/// lodging and per diems are carried by the paying participants. Sums and
/// products saturate at the `Decimal` range, so no input can panic.
pub fn aggregate_costs(
    params: &QuoteParameters,
    costs: &QuoteCosts,
    auxiliary: &[AuxiliaryLineItem],
) -> CostBreakdown {
    let lodging = lodging_total(params, costs);
    let days = Decimal::from(params.total_days);

    let agency_trip = saturating_sum([
        costs.flight_cost_per_person,
        lodging,
        days.saturating_mul(costs.agency_per_diem),
    ]);
    let agency_total = Decimal::from(params.agency_staff_count).saturating_mul(agency_trip);
    let professor_total = saturating_sum([
        costs.flight_cost_per_person,
        lodging,
        days.saturating_mul(costs.professor_per_diem),
    ]);

    let fixed_per_person =
        agency_total.saturating_add(professor_total) / guaranteed_headcount(params);

    let optional = [
        costs.airport_transport.as_ref().map(|t| t.per_person()),
        costs.site_transport.as_ref().map(|t| t.per_person()),
        costs.meals.as_ref().map(|m| m.per_person()),
    ];
    let variable_per_person = saturating_sum(
        [
            costs.flight_cost_per_person,
            costs.insurance_per_person,
            costs.fee_per_person,
        ]
        .into_iter()
        .chain(auxiliary.iter().map(|item| item.value_per_person))
        .chain(optional.into_iter().flatten()),
    );

    CostBreakdown {
        fixed_per_person,
        variable_per_person,
    }
}

/// Inflate `subtotal` so the bank commission can be deducted from it.
///
/// Negative rates count as zero. A rate of 1 or more (or one so close to 1
/// that the division overflows) leaves the subtotal unchanged; the second
/// element reports whether the gross-up was applied.
pub fn gross_up(subtotal: Decimal, rate: Decimal) -> (Decimal, bool) {
    let rate = rate.max(Decimal::ZERO);
    if rate >= Decimal::ONE {
        return (subtotal, false);
    }

    match subtotal.checked_div(Decimal::ONE - rate) {
        Some(gross) => (gross, true),
        None => (subtotal, false),
    }
}

/// Price for one occupancy tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyPrice {
    pub occupancy: Occupancy,
    pub room_share: Decimal,
    pub singles_surcharge: Decimal,
    pub subtotal: Decimal,
    pub gross_price: Decimal,
    pub commission_applied: bool,
}

/// Price a single occupancy tier from the shared cost breakdown
pub fn price_occupancy(
    breakdown: &CostBreakdown,
    occupancy: Occupancy,
    params: &QuoteParameters,
    costs: &QuoteCosts,
) -> OccupancyPrice {
    let lodging = lodging_total(params, costs);
    let room_share = lodging / Decimal::from(occupancy.occupants());

    let singles_surcharge = match &costs.singles_contingency {
        Some(contingency) => {
            contingency.factor.saturating_mul(lodging) / guaranteed_headcount(params)
        }
        None => Decimal::ZERO,
    };

    let subtotal = saturating_sum([
        breakdown.fixed_per_person,
        breakdown.variable_per_person,
        room_share,
        singles_surcharge,
    ]);
    let (gross_price, commission_applied) = gross_up(subtotal, costs.bank_commission_rate);

    OccupancyPrice {
        occupancy,
        room_share,
        singles_surcharge,
        subtotal,
        gross_price,
        commission_applied,
    }
}

/// Financed equivalent of a gross price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financing {
    pub financed_total: Decimal,
    pub installment_amount: Decimal,
    pub installment_count: i32,
}

/// Apply the financing markup and split into equal installments.
///
/// `installment_count` below one is treated as a single payment.
pub fn project_financing(gross_price: Decimal, installment_count: i32) -> Financing {
    let installment_count = installment_count.max(1);
    let financed_total = gross_price.saturating_mul(FINANCING_MARKUP);

    Financing {
        financed_total,
        installment_amount: financed_total / Decimal::from(installment_count),
        installment_count,
    }
}

/// Price and financing for one occupancy tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierQuote {
    pub price: OccupancyPrice,
    pub financing: Financing,
}

/// Complete output of one recompute
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResult {
    pub breakdown: CostBreakdown,
    /// Tiers in occupancy order: single, double, triple, quad
    pub tiers: [TierQuote; 4],
    pub installment_count: i32,
    pub commission_applied: bool,
    pub summary: String,
}

impl QuoteResult {
    pub fn tier(&self, occupancy: Occupancy) -> &TierQuote {
        &self.tiers[occupancy.occupants() as usize - 1]
    }

    pub fn single_price(&self) -> Decimal {
        self.tier(Occupancy::Single).price.gross_price
    }

    pub fn double_price(&self) -> Decimal {
        self.tier(Occupancy::Double).price.gross_price
    }
}

/// Recompute every tier of a quote from scratch
pub fn compute_quote(input: &QuoteInput) -> QuoteResult {
    let params = &input.parameters;
    let costs = &input.costs;
    let breakdown = aggregate_costs(params, costs, &input.auxiliary);

    let tiers = Occupancy::ALL.map(|occupancy| {
        let price = price_occupancy(&breakdown, occupancy, params, costs);
        let financing = project_financing(price.gross_price, input.installment_count);
        TierQuote { price, financing }
    });

    QuoteResult {
        breakdown,
        commission_applied: tiers.iter().all(|t| t.price.commission_applied),
        installment_count: input.installment_count.max(1),
        tiers,
        summary: build_summary(input),
    }
}
