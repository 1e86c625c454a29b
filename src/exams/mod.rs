//! # Exams Module
//!
//! This module handles exam functionality including:
//! - Spreadsheet-driven exam import
//! - Hydrated exam retrieval (exam + ordered question list)

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::exams_routes;
