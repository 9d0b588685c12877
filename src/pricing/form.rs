//! Free-text quote form and its conversion into [`QuoteInput`].
//!
//! Every numeric field is kept as the string the user typed so a saved
//! snapshot reloads into the editor exactly as it was entered. Conversion
//! never fails: empty or unparseable values become zero.

use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};

use super::inputs::{
    AuxiliaryLineItem, DailyTransport, MealPlan, QuoteCosts, QuoteInput, QuoteParameters,
    SinglesContingency,
};

/// Largest magnitude accepted for a money field
const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Largest magnitude accepted for a count field (nights, staff, meals, ...)
const MAX_COUNT: i32 = 100_000;

/// Parse a user-typed money or rate value.
///
/// Currency symbols, thousands separators and whitespace are ignored.
/// Empty, invalid or out-of-range input yields zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '$' | ',' | '_'))
        .collect();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO);

    if value.abs() > MAX_AMOUNT {
        Decimal::ZERO
    } else {
        value
    }
}

/// Parse a user-typed count. Fractions are truncated.
pub fn parse_count(raw: &str) -> i32 {
    match parse_amount(raw).trunc().to_i32() {
        Some(n) if n.abs() <= MAX_COUNT => n,
        _ => 0,
    }
}

/// Interpret a checkbox-style value
pub fn parse_toggle(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes" | "checked"
    )
}

/// Accept either a JSON string or a JSON number for a numeric form field
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawField {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match RawField::deserialize(deserializer)? {
        RawField::Text(s) => s,
        RawField::Number(n) => n.to_string(),
        RawField::Null(()) => String::new(),
    })
}

/// An add-on row as typed in the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryForm {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub value: String,
}

/// Raw state of the quote editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    #[serde(deserialize_with = "text_or_number")]
    pub min_participants: String,
    #[serde(deserialize_with = "text_or_number")]
    pub nights: String,
    #[serde(deserialize_with = "text_or_number")]
    pub total_days: String,
    #[serde(deserialize_with = "text_or_number")]
    pub agency_staff_count: String,
    #[serde(deserialize_with = "text_or_number")]
    pub installment_count: String,

    #[serde(deserialize_with = "text_or_number")]
    pub room_cost_per_night: String,
    #[serde(deserialize_with = "text_or_number")]
    pub flight_cost_per_person: String,
    #[serde(deserialize_with = "text_or_number")]
    pub agency_per_diem: String,
    #[serde(deserialize_with = "text_or_number")]
    pub professor_per_diem: String,

    pub include_airport_transport: bool,
    #[serde(deserialize_with = "text_or_number")]
    pub airport_transport_days: String,
    #[serde(deserialize_with = "text_or_number")]
    pub airport_transport_per_day: String,

    pub include_site_transport: bool,
    #[serde(deserialize_with = "text_or_number")]
    pub site_transport_days: String,
    #[serde(deserialize_with = "text_or_number")]
    pub site_transport_per_day: String,

    pub include_meals: bool,
    #[serde(deserialize_with = "text_or_number")]
    pub meal_cost: String,
    #[serde(deserialize_with = "text_or_number")]
    pub meal_count: String,

    #[serde(deserialize_with = "text_or_number")]
    pub insurance_per_person: String,
    #[serde(deserialize_with = "text_or_number")]
    pub fee_per_person: String,
    #[serde(deserialize_with = "text_or_number")]
    pub bank_commission_rate: String,

    pub include_singles_contingency: bool,
    #[serde(deserialize_with = "text_or_number")]
    pub singles_contingency_factor: String,

    pub auxiliary: Vec<AuxiliaryForm>,
}

impl QuoteForm {
    /// Build a form from url-encoded key/value pairs.
    ///
    /// Add-on rows arrive as repeated `aux_description` / `aux_value` keys and
    /// are paired up in submission order. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = QuoteForm::default();
        let mut descriptions: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "min_participants" => form.min_participants = value,
                "nights" => form.nights = value,
                "total_days" => form.total_days = value,
                "agency_staff_count" => form.agency_staff_count = value,
                "installment_count" => form.installment_count = value,
                "room_cost_per_night" => form.room_cost_per_night = value,
                "flight_cost_per_person" => form.flight_cost_per_person = value,
                "agency_per_diem" => form.agency_per_diem = value,
                "professor_per_diem" => form.professor_per_diem = value,
                "include_airport_transport" => {
                    form.include_airport_transport = parse_toggle(&value)
                }
                "airport_transport_days" => form.airport_transport_days = value,
                "airport_transport_per_day" => form.airport_transport_per_day = value,
                "include_site_transport" => form.include_site_transport = parse_toggle(&value),
                "site_transport_days" => form.site_transport_days = value,
                "site_transport_per_day" => form.site_transport_per_day = value,
                "include_meals" => form.include_meals = parse_toggle(&value),
                "meal_cost" => form.meal_cost = value,
                "meal_count" => form.meal_count = value,
                "insurance_per_person" => form.insurance_per_person = value,
                "fee_per_person" => form.fee_per_person = value,
                "bank_commission_rate" => form.bank_commission_rate = value,
                "include_singles_contingency" => {
                    form.include_singles_contingency = parse_toggle(&value)
                }
                "singles_contingency_factor" => form.singles_contingency_factor = value,
                "aux_description" => descriptions.push(value),
                "aux_value" => values.push(value),
                _ => {}
            }
        }

        let rows = descriptions.len().max(values.len());
        form.auxiliary = (0..rows)
            .map(|i| AuxiliaryForm {
                description: descriptions.get(i).cloned().unwrap_or_default(),
                value: values.get(i).cloned().unwrap_or_default(),
            })
            .filter(|row| !(row.description.trim().is_empty() && row.value.trim().is_empty()))
            .collect();

        form
    }

    /// Convert the typed values into the calculator's input record
    pub fn to_input(&self) -> QuoteInput {
        let parameters = QuoteParameters {
            min_participants: parse_count(&self.min_participants),
            nights: parse_count(&self.nights),
            total_days: parse_count(&self.total_days),
            agency_staff_count: parse_count(&self.agency_staff_count),
        };

        let airport_transport = self.include_airport_transport.then(|| DailyTransport {
            days: parse_count(&self.airport_transport_days),
            per_person_per_day: parse_amount(&self.airport_transport_per_day),
        });

        let site_transport = self.include_site_transport.then(|| DailyTransport {
            days: parse_count(&self.site_transport_days),
            per_person_per_day: parse_amount(&self.site_transport_per_day),
        });

        let meals = self.include_meals.then(|| MealPlan {
            cost_per_meal: parse_amount(&self.meal_cost),
            meal_count: parse_count(&self.meal_count),
        });

        let singles_contingency = self.include_singles_contingency.then(|| SinglesContingency {
            factor: parse_amount(&self.singles_contingency_factor),
        });

        let costs = QuoteCosts {
            room_cost_per_night: parse_amount(&self.room_cost_per_night),
            flight_cost_per_person: parse_amount(&self.flight_cost_per_person),
            agency_per_diem: parse_amount(&self.agency_per_diem),
            professor_per_diem: parse_amount(&self.professor_per_diem),
            airport_transport,
            site_transport,
            meals,
            insurance_per_person: parse_amount(&self.insurance_per_person),
            fee_per_person: parse_amount(&self.fee_per_person),
            bank_commission_rate: parse_amount(&self.bank_commission_rate),
            singles_contingency,
        };

        let auxiliary = self
            .auxiliary
            .iter()
            .map(|row| AuxiliaryLineItem {
                description: row.description.trim().to_string(),
                value_per_person: parse_amount(&row.value),
            })
            .collect();

        QuoteInput {
            parameters,
            costs,
            auxiliary,
            installment_count: parse_count(&self.installment_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_empty_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_invalid_is_zero() {
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("1.2.3"), Decimal::ZERO);
        assert_eq!(parse_amount("NaN"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_strips_formatting() {
        assert_eq!(parse_amount("$1,200.50"), dec!(1200.50));
        assert_eq!(parse_amount(" 120 "), dec!(120));
        assert_eq!(parse_amount("0.04"), dec!(0.04));
        assert_eq!(parse_amount("-15"), dec!(-15));
    }

    #[test]
    fn test_parse_amount_scientific() {
        assert_eq!(parse_amount("4e-2"), dec!(0.04));
    }

    #[test]
    fn test_parse_amount_out_of_range_is_zero() {
        assert_eq!(parse_amount("1000000000000"), dec!(1000000000000));
        assert_eq!(parse_amount("1000000000001"), Decimal::ZERO);
        assert_eq!(parse_amount("99999999999999999999999999999999"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("10"), 10);
        assert_eq!(parse_count("5.9"), 5);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("ten"), 0);
        assert_eq!(parse_count("-3"), -3);
        assert_eq!(parse_count("100001"), 0);
    }

    #[test]
    fn test_parse_toggle() {
        assert!(parse_toggle("on"));
        assert!(parse_toggle("TRUE"));
        assert!(parse_toggle("1"));
        assert!(!parse_toggle(""));
        assert!(!parse_toggle("off"));
        assert!(!parse_toggle("0"));
    }

    #[test]
    fn test_toggle_off_ignores_fields() {
        let form = QuoteForm {
            include_meals: false,
            meal_cost: "25".to_string(),
            meal_count: "10".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_input().costs.meals, None);

        let form = QuoteForm {
            include_meals: true,
            ..form
        };
        assert_eq!(
            form.to_input().costs.meals,
            Some(MealPlan {
                cost_per_meal: dec!(25),
                meal_count: 10,
            })
        );
    }

    #[test]
    fn test_from_pairs_pairs_auxiliary_rows_in_order() {
        let pairs = vec![
            ("nights", "5"),
            ("include_meals", "on"),
            ("aux_description", "Theme Park Pass"),
            ("aux_value", "150"),
            ("aux_description", "Museum"),
            ("aux_value", "$30"),
            ("aux_description", ""),
            ("aux_value", ""),
            ("csrf", "ignored"),
        ];

        let form = QuoteForm::from_pairs(pairs);
        assert_eq!(form.nights, "5");
        assert!(form.include_meals);
        assert!(!form.include_site_transport);
        assert_eq!(form.auxiliary.len(), 2);
        assert_eq!(form.auxiliary[1].description, "Museum");

        let input = form.to_input();
        assert_eq!(input.auxiliary[0].value_per_person, dec!(150));
        assert_eq!(input.auxiliary[1].value_per_person, dec!(30));
    }

    #[test]
    fn test_deserialize_json_numbers_and_strings() {
        let form: QuoteForm = serde_json::from_value(serde_json::json!({
            "nights": 5,
            "room_cost_per_night": "120",
            "bank_commission_rate": 0.04,
            "min_participants": null,
            "include_meals": true,
            "auxiliary": [{ "description": "Theme Park Pass", "value": 150 }]
        }))
        .unwrap();

        assert_eq!(form.nights, "5");
        assert_eq!(form.room_cost_per_night, "120");
        assert_eq!(form.bank_commission_rate, "0.04");
        assert_eq!(form.min_participants, "");
        assert!(form.include_meals);
        assert_eq!(form.auxiliary[0].value, "150");
    }
}
