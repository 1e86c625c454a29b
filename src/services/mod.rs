// src/services/mod.rs
//
// Shared services module containing the exam import pipeline stages

pub mod exam_import;
pub mod questions;
pub mod uploads;
pub mod workbook;
