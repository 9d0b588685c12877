//! Database models shared across the application

pub mod program;

pub use program::Program;
