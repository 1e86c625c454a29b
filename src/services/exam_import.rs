// src/services/exam_import.rs
//! Spreadsheet-driven exam import pipeline.
//!
//! One invocation covers one upload: materialize the file, load the
//! workbook, normalize rows, persist exam + questions + links in a single
//! transaction, and clean up the temp file on every outcome.

use chrono::Utc;
use sqlx::SqlitePool;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::ApiError;
use crate::exams::models::{
    CreateExamRequest, Exam, ExamQuestionRow, ExamResponse, ParsedQuestionRecord,
};
use crate::services::questions::{self, RowOutcome};
use crate::services::uploads::{self, UploadArtifact};
use crate::services::workbook::{self, WorkbookError, SKIP_ROWS};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error("Spreadsheet contains no valid questions")]
    NoValidQuestions,

    #[error("Category not found: {0}")]
    UnknownCategory(i64),

    #[error("Subcategory not found: {0}")]
    UnknownSubCategory(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Database(err) => ApiError::DatabaseError(err),
            ImportError::Storage(err) => ApiError::InternalServer(err.to_string()),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Run the full import pipeline for one uploaded spreadsheet and return the
/// new exam's id.
///
/// The materialized file is deleted after a successful import and on every
/// failure path; the upload's source file is likewise removed on every
/// outcome. Cleanup never masks the primary result.
pub async fn import_exam(
    pool: &SqlitePool,
    uploads_dir: &Path,
    request: &CreateExamRequest,
    upload: &UploadArtifact,
) -> Result<i64, ImportError> {
    let materialized = match uploads::materialize(uploads_dir, upload).await {
        Ok(path) => path,
        Err(e) => {
            uploads::discard_source(upload).await;
            return Err(e.into());
        }
    };

    let result = ingest(pool, request, &materialized).await;

    uploads::discard_materialized(&materialized).await;
    if result.is_err() {
        uploads::discard_source(upload).await;
    }

    result
}

async fn ingest(
    pool: &SqlitePool,
    request: &CreateExamRequest,
    path: &Path,
) -> Result<i64, ImportError> {
    if !category_exists(pool, request.category_id).await? {
        return Err(ImportError::UnknownCategory(request.category_id));
    }
    if let Some(sub_category_id) = request.sub_category_id {
        if !category_exists(pool, sub_category_id).await? {
            return Err(ImportError::UnknownSubCategory(sub_category_id));
        }
    }

    let range = workbook::load_first_sheet(path)?;
    let raw_rows = workbook::extract_rows(&range)?;

    let mut records: Vec<ParsedQuestionRecord> = Vec::new();
    let mut skipped = 0usize;
    for raw in raw_rows {
        match questions::normalize(&raw) {
            RowOutcome::Parsed(record) => records.push(record),
            RowOutcome::Skipped {
                display_order,
                reason,
            } => {
                skipped += 1;
                warn!(
                    row = display_order + i64::from(SKIP_ROWS),
                    reason = %reason,
                    "Skipping spreadsheet row"
                );
            }
        }
    }

    if records.is_empty() {
        return Err(ImportError::NoValidQuestions);
    }

    info!(
        parsed = records.len(),
        skipped,
        exam_name = %request.name,
        "Parsed exam spreadsheet"
    );

    persist_exam(pool, request, &records).await
}

async fn category_exists(pool: &SqlitePool, category_id: i64) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM exam_categories WHERE id = ? AND is_deleted = 0",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Create the exam, its questions, and the ordered links inside one
/// transaction, so a mid-loop failure leaves no orphaned rows behind.
async fn persist_exam(
    pool: &SqlitePool,
    request: &CreateExamRequest,
    records: &[ParsedQuestionRecord],
) -> Result<i64, ImportError> {
    let now = Utc::now().to_rfc3339();
    let mut tx = pool.begin().await?;

    let exam_id = sqlx::query(
        r#"
        INSERT INTO exams
            (name, summary, description, category_id, sub_category_id,
             is_public, owner_user_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(request.name.trim())
    .bind(&request.summary)
    .bind(&request.description)
    .bind(request.category_id)
    .bind(request.sub_category_id)
    .bind(request.is_public as i64)
    .bind(request.owner_user_id)
    .bind(&now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for record in records {
        let options_json =
            serde_json::to_string(&record.options).unwrap_or_else(|_| "[]".to_string());
        let answer = (!record.answer.is_empty()).then_some(record.answer.as_str());
        let analysis = (!record.analysis.is_empty()).then_some(record.analysis.as_str());

        let question_id = sqlx::query(
            r#"
            INSERT INTO questions
                (question_type, stem, options, answer, analysis, difficulty, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.question_type.as_str())
        .bind(&record.stem)
        .bind(options_json)
        .bind(answer)
        .bind(analysis)
        .bind(record.difficulty.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO exam_questions (exam_id, question_id, display_order, score, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(exam_id)
        .bind(question_id)
        .bind(record.display_order)
        .bind(record.score)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(exam_id, questions = records.len(), "Exam import persisted");

    Ok(exam_id)
}

/// Fetch an exam with its ordered question list, or None if the exam does
/// not exist or was soft-deleted.
pub async fn fetch_exam_with_questions(
    pool: &SqlitePool,
    exam_id: i64,
) -> Result<Option<ExamResponse>, sqlx::Error> {
    let exam = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, name, summary, description, category_id, sub_category_id,
               is_public, owner_user_id, created_at
        FROM exams
        WHERE id = ? AND is_deleted = 0
        "#,
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?;

    let Some(exam) = exam else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, ExamQuestionRow>(
        r#"
        SELECT q.id, q.question_type, q.stem, q.options, q.answer, q.analysis,
               q.difficulty, eq.display_order, eq.score
        FROM exam_questions eq
        JOIN questions q ON q.id = eq.question_id
        WHERE eq.exam_id = ? AND q.is_deleted = 0
        ORDER BY eq.display_order ASC
        "#,
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await?;

    let questions = rows.into_iter().map(Into::into).collect();

    Ok(Some(ExamResponse::from_parts(exam, questions)))
}
