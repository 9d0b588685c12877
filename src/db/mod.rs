//! Database access for programs and schema setup

pub mod queries;
pub mod schema;

pub use queries::*;
