//! Domain input types for the program quote calculator.
//!
//! These are immutable value types. Free-text form input is converted into
//! them once (see `form.rs`); the calculators only ever see these.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trip headcounts and durations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteParameters {
    /// Guaranteed minimum number of paying participants.
    /// Values below 1 are treated as 1 by the calculators.
    pub min_participants: i32,
    pub nights: i32,
    pub total_days: i32,
    pub agency_staff_count: i32,
}

/// A per-person transport charge billed per day of use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTransport {
    pub days: i32,
    pub per_person_per_day: Decimal,
}

impl DailyTransport {
    pub fn per_person(&self) -> Decimal {
        Decimal::from(self.days).saturating_mul(self.per_person_per_day)
    }
}

/// Meals bundled into the program price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub cost_per_meal: Decimal,
    pub meal_count: i32,
}

impl MealPlan {
    pub fn per_person(&self) -> Decimal {
        self.cost_per_meal.saturating_mul(Decimal::from(self.meal_count))
    }
}

/// Reserve for rooms that end up single-occupied because the group
/// does not pair up evenly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglesContingency {
    pub factor: Decimal,
}

/// Per-person cost line items.
///
/// Toggle-gated categories are `Option`s: `None` means the category is not
/// part of the program and its term never enters the price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteCosts {
    pub room_cost_per_night: Decimal,
    pub flight_cost_per_person: Decimal,
    pub agency_per_diem: Decimal,
    pub professor_per_diem: Decimal,
    pub airport_transport: Option<DailyTransport>,
    pub site_transport: Option<DailyTransport>,
    pub meals: Option<MealPlan>,
    pub insurance_per_person: Decimal,
    pub fee_per_person: Decimal,
    /// Card/bank processing commission as a fraction (0.04 = 4%)
    pub bank_commission_rate: Decimal,
    pub singles_contingency: Option<SinglesContingency>,
}

/// Named add-on cost charged to every participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryLineItem {
    pub description: String,
    pub value_per_person: Decimal,
}

/// Everything the calculator needs for one recompute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub parameters: QuoteParameters,
    pub costs: QuoteCosts,
    pub auxiliary: Vec<AuxiliaryLineItem>,
    pub installment_count: i32,
}

/// Room occupancy tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Single,
    Double,
    Triple,
    Quad,
}

impl Occupancy {
    pub const ALL: [Occupancy; 4] = [
        Occupancy::Single,
        Occupancy::Double,
        Occupancy::Triple,
        Occupancy::Quad,
    ];

    /// Number of participants sharing the room
    pub fn occupants(self) -> u32 {
        match self {
            Occupancy::Single => 1,
            Occupancy::Double => 2,
            Occupancy::Triple => 3,
            Occupancy::Quad => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Occupancy::Single => "Single",
            Occupancy::Double => "Double",
            Occupancy::Triple => "Triple",
            Occupancy::Quad => "Quad",
        }
    }
}
