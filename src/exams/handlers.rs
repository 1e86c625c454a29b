// src/exams/handlers.rs
//! Exam import and retrieval endpoints

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::{ApiError, AppState, Validator};
use crate::exams::models::{CreateExamRequest, ExamResponse};
use crate::services::exam_import;
use crate::services::uploads::UploadArtifact;

/// POST /api/admin/exams/import - Create an exam from an uploaded spreadsheet
///
/// Multipart fields: exam metadata as text fields plus the workbook under
/// `file`. Owner identity is supplied by the upstream auth boundary.
pub async fn import_exam(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let mut name = String::new();
    let mut summary: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category_id: Option<i64> = None;
    let mut sub_category_id: Option<i64> = None;
    let mut is_public = true;
    let mut owner_user_id: Option<i64> = None;
    let mut original_name = String::new();
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart payload".to_string()))?
    {
        match field.name() {
            Some("name") => name = field.text().await.unwrap_or_default(),
            Some("summary") => {
                summary = Some(field.text().await.unwrap_or_default()).filter(|s| !s.is_empty())
            }
            Some("description") => {
                description =
                    Some(field.text().await.unwrap_or_default()).filter(|s| !s.is_empty())
            }
            Some("category_id") => {
                category_id = field.text().await.ok().and_then(|s| s.trim().parse().ok())
            }
            Some("sub_category_id") => {
                sub_category_id = field.text().await.ok().and_then(|s| s.trim().parse().ok())
            }
            Some("is_public") => {
                let text = field.text().await.unwrap_or_default();
                is_public = !matches!(text.trim(), "false" | "0");
            }
            Some("owner_user_id") => {
                owner_user_id = field.text().await.ok().and_then(|s| s.trim().parse().ok())
            }
            Some("file") => {
                original_name = field.file_name().unwrap_or("exam.xlsx").to_string();
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let request = CreateExamRequest {
        name,
        summary,
        description,
        category_id: category_id
            .ok_or_else(|| ApiError::BadRequest("category_id is required".to_string()))?,
        sub_category_id,
        is_public,
        owner_user_id: owner_user_id
            .ok_or_else(|| ApiError::BadRequest("owner_user_id is required".to_string()))?,
    };

    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let data = file_data
        .ok_or_else(|| ApiError::BadRequest("No spreadsheet file provided".to_string()))?;

    info!(
        exam_name = %request.name,
        file = %original_name,
        size = data.len(),
        "Importing exam from spreadsheet"
    );

    let upload = UploadArtifact {
        path: None,
        size_bytes: data.len() as u64,
        buffer: Some(data),
        original_name,
    };

    let exam_id =
        exam_import::import_exam(&state.db, &state.uploads_dir, &request, &upload).await?;

    let exam = exam_import::fetch_exam_with_questions(&state.db, exam_id)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| {
            ApiError::InternalServer("Imported exam could not be reloaded".to_string())
        })?;

    Ok((StatusCode::CREATED, Json(exam)))
}

/// GET /api/exams/:id - Fetch an exam with its ordered question list
pub async fn get_exam_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(exam_id): Path<i64>,
) -> Result<Json<ExamResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let exam = exam_import::fetch_exam_with_questions(&state.db, exam_id)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("Exam not found: {}", exam_id)))?;

    Ok(Json(exam))
}
