//! Page route handlers

pub mod calculator;
pub mod health;
