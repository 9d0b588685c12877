//! Travel program models

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Travel program from the programs table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub destination_city: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Program {
    /// Human-readable travel dates, empty when the program is not scheduled yet
    pub fn date_range(&self) -> String {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start != end => format!(
                "{} to {}",
                start.format("%b %-d, %Y"),
                end.format("%b %-d, %Y")
            ),
            (Some(start), _) => start.format("%b %-d, %Y").to_string(),
            (None, Some(end)) => format!("until {}", end.format("%b %-d, %Y")),
            (None, None) => String::new(),
        }
    }
}
