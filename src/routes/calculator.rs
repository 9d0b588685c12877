//! Quote calculator page handlers

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::calculators::{round_money, QuoteResult};
use crate::pricing::form::{AuxiliaryForm, QuoteForm};
use crate::pricing::requests::SaveSnapshotRequest;
use crate::pricing::responses::COMMISSION_SKIPPED_WARNING;
use crate::pricing::services;
use crate::AppState;

/// Blank add-on rows always offered below the filled ones
const BLANK_AUX_ROWS: usize = 3;

/// Format an amount as `1,234.56`
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = round_money(amount, 2);
    rounded.rescale(2);
    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, cents)
}

/// One row of the results table
struct TierRow {
    label: &'static str,
    occupants: u32,
    price: String,
    financed_total: String,
    installment_amount: String,
}

/// Read-only results panel
struct ResultsPanel {
    fixed_cost_per_person: String,
    variable_cost_per_person: String,
    tiers: Vec<TierRow>,
    installment_count: i32,
    summary: String,
    commission_warning: Option<&'static str>,
}

impl ResultsPanel {
    fn from_result(result: &QuoteResult) -> Self {
        Self {
            fixed_cost_per_person: format_money(result.breakdown.fixed_per_person),
            variable_cost_per_person: format_money(result.breakdown.variable_per_person),
            tiers: result
                .tiers
                .iter()
                .map(|tier| TierRow {
                    label: tier.price.occupancy.label(),
                    occupants: tier.price.occupancy.occupants(),
                    price: format_money(tier.price.gross_price),
                    financed_total: format_money(tier.financing.financed_total),
                    installment_amount: format_money(tier.financing.installment_amount),
                })
                .collect(),
            installment_count: result.installment_count,
            summary: result.summary.clone(),
            commission_warning: (!result.commission_applied).then_some(COMMISSION_SKIPPED_WARNING),
        }
    }
}

/// Program the editor saves into; the label is set when a snapshot is open
struct ProgramContext {
    program_id: Uuid,
    program_name: String,
    snapshot_label: Option<String>,
}

/// Calculator page template
#[derive(Template)]
#[template(path = "quote/calculator.html")]
pub struct CalculatorTemplate {
    form: QuoteForm,
    aux_rows: Vec<AuxiliaryForm>,
    results: Option<ResultsPanel>,
    program: Option<ProgramContext>,
    currency: String,
}

impl CalculatorTemplate {
    fn new(
        state: &AppState,
        form: QuoteForm,
        result: Option<&QuoteResult>,
        program: Option<ProgramContext>,
    ) -> Self {
        let mut aux_rows = form.auxiliary.clone();
        aux_rows.extend(std::iter::repeat_with(AuxiliaryForm::default).take(BLANK_AUX_ROWS));

        Self {
            form,
            aux_rows,
            results: result.map(ResultsPanel::from_result),
            program,
            currency: state.config.currency.clone(),
        }
    }
}

/// Empty calculator
pub async fn new_quote(State(state): State<AppState>) -> CalculatorTemplate {
    CalculatorTemplate::new(&state, QuoteForm::default(), None, None)
}

/// Empty calculator that saves its first snapshot into a program
pub async fn new_program_quote(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> Result<Html<String>> {
    let program = services::get_program(&state.db, &state.cache, program_id).await?;

    let context = ProgramContext {
        program_id,
        program_name: program.name.clone(),
        snapshot_label: None,
    };
    let template = CalculatorTemplate::new(&state, QuoteForm::default(), None, Some(context));

    Ok(Html(template.render()?))
}

/// Recompute from a submitted form and re-render the page with results
pub async fn preview(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let form = QuoteForm::from_pairs(pairs);
    let result = services::calculate(&form);
    let template = CalculatorTemplate::new(&state, form, Some(&result), None);

    Ok(Html(template.render()?))
}

/// Calculator preloaded from a saved snapshot
pub async fn show_snapshot(
    State(state): State<AppState>,
    Path((program_id, snapshot_id)): Path<(Uuid, Uuid)>,
) -> Result<Html<String>> {
    let (snapshot, form, result) = services::load_snapshot(&state.db, snapshot_id).await?;
    if snapshot.program_id != program_id {
        return Err(AppError::NotFound);
    }
    let program = services::get_program(&state.db, &state.cache, program_id).await?;

    let context = ProgramContext {
        program_id,
        program_name: program.name.clone(),
        snapshot_label: Some(snapshot.label),
    };
    let template = CalculatorTemplate::new(&state, form, Some(&result), Some(context));

    Ok(Html(template.render()?))
}

/// Save the submitted form as a new snapshot and open it
pub async fn save_snapshot(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let field = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let request = SaveSnapshotRequest {
        label: field("label").unwrap_or_default(),
        destination_city: field("destination_city"),
        date_range: field("date_range"),
        input: QuoteForm::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
    };

    let saved = services::save_snapshot(&state.db, &state.cache, program_id, &request).await?;

    Ok(Redirect::to(&format!(
        "/programs/{}/quotes/{}",
        program_id, saved.id
    )))
}
