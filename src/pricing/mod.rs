//! Quote engine for study-trip programs.
//!
//! Turns trip parameters and per-person costs into single/double/triple/quad
//! prices, their financed equivalents and an inclusions summary, and saves
//! labeled snapshots of a quote against a program.

pub mod calculators;
pub mod form;
pub mod inputs;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod summary;

// Re-export commonly used items
pub use calculators::{compute_quote, round_money, QuoteResult};
pub use form::QuoteForm;
pub use inputs::{Occupancy, QuoteInput};
pub use routes::router;
pub use services::QuoteError;
