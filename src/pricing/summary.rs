//! "Price includes ..." sentence shown under the quote and stored with snapshots.

use rust_decimal::Decimal;

use super::inputs::QuoteInput;

fn plural(count: i32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Enumerate what the quoted price covers.
///
/// Fixed inclusions come first, then the optional categories that are
/// switched on (airport transfers, local transportation, meals), then every
/// add-on with a nonzero value in the order it was entered.
pub fn build_summary(input: &QuoteInput) -> String {
    let nights = input.parameters.nights.max(0);
    let mut parts: Vec<String> = vec![
        "round-trip airfare".to_string(),
        format!("{} of lodging", plural(nights, "night", "nights")),
        "travel insurance".to_string(),
        "program fee".to_string(),
    ];

    if input.costs.airport_transport.is_some() {
        parts.push("airport transfers".to_string());
    }
    if input.costs.site_transport.is_some() {
        parts.push("local transportation".to_string());
    }
    if let Some(meals) = &input.costs.meals {
        parts.push(plural(meals.meal_count.max(0), "meal", "meals"));
    }

    let add_ons: Vec<&str> = input
        .auxiliary
        .iter()
        .filter(|item| item.value_per_person != Decimal::ZERO)
        .map(|item| item.description.trim())
        .filter(|description| !description.is_empty())
        .collect();
    if !add_ons.is_empty() {
        parts.push(add_ons.join(", "));
    }

    format!("Price includes {}.", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::inputs::{
        AuxiliaryLineItem, DailyTransport, MealPlan, QuoteCosts, QuoteParameters,
        SinglesContingency,
    };
    use rust_decimal_macros::dec;

    fn input_with_nights(nights: i32) -> QuoteInput {
        QuoteInput {
            parameters: QuoteParameters {
                nights,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_fixed_inclusions_only() {
        assert_eq!(
            build_summary(&input_with_nights(5)),
            "Price includes round-trip airfare, 5 nights of lodging, travel insurance, program fee."
        );
        assert!(build_summary(&input_with_nights(1)).contains("1 night of lodging"));
    }

    #[test]
    fn test_summary_active_categories_in_fixed_order() {
        let mut input = input_with_nights(5);
        input.costs = QuoteCosts {
            meals: Some(MealPlan {
                cost_per_meal: dec!(10),
                meal_count: 8,
            }),
            site_transport: Some(DailyTransport {
                days: 3,
                per_person_per_day: dec!(20),
            }),
            airport_transport: Some(DailyTransport {
                days: 2,
                per_person_per_day: dec!(15),
            }),
            singles_contingency: Some(SinglesContingency { factor: dec!(1) }),
            ..Default::default()
        };

        assert_eq!(
            build_summary(&input),
            "Price includes round-trip airfare, 5 nights of lodging, travel insurance, \
             program fee, airport transfers, local transportation, 8 meals."
        );
    }

    #[test]
    fn test_summary_lists_nonzero_auxiliary_items() {
        let mut input = input_with_nights(3);
        input.auxiliary = vec![
            AuxiliaryLineItem {
                description: "Theme Park Pass".to_string(),
                value_per_person: dec!(150),
            },
            AuxiliaryLineItem {
                description: "Free Walking Tour".to_string(),
                value_per_person: dec!(0),
            },
            AuxiliaryLineItem {
                description: "Museum Tickets".to_string(),
                value_per_person: dec!(35),
            },
        ];

        let summary = build_summary(&input);
        assert!(summary.ends_with("program fee, Theme Park Pass, Museum Tickets."));
        assert!(!summary.contains("Free Walking Tour"));
    }
}
