// src/exams/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the exams router
pub fn exams_routes() -> Router {
    Router::new()
        .route("/api/admin/exams/import", post(handlers::import_exam))
        .route("/api/exams/:id", get(handlers::get_exam_by_id))
}
