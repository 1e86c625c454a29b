// src/exams/models.rs
//! Exam, question, and import pipeline data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The kind of question a spreadsheet row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FillBlank => "fill_blank",
        }
    }

    /// Whether this type requires at least one assembled option
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

/// Ordinal difficulty scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A single lettered option on a choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub key: String,
    pub value: String,
}

/// The in-memory result of normalizing one spreadsheet row, before persistence
#[derive(Debug, Clone)]
pub struct ParsedQuestionRecord {
    pub question_type: QuestionType,
    pub stem: String,
    pub options: Vec<QuestionOption>,
    pub answer: String,
    pub analysis: String,
    pub difficulty: Difficulty,
    pub display_order: i64,
    pub score: i64,
}

/// Metadata supplied alongside the uploaded spreadsheet
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExamRequest {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    pub owner_user_id: i64,
}

fn default_is_public() -> bool {
    true
}

/// Exam row as persisted
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exam {
    pub id: i64,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    pub is_public: i64,
    pub owner_user_id: i64,
    pub created_at: String,
}

/// One question of a hydrated exam, joined through exam_questions
#[derive(Debug, Clone, FromRow)]
pub struct ExamQuestionRow {
    pub id: i64,
    pub question_type: String,
    pub stem: String,
    pub options: String,
    pub answer: Option<String>,
    pub analysis: Option<String>,
    pub difficulty: String,
    pub display_order: i64,
    pub score: i64,
}

/// Question as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ExamQuestionView {
    pub id: i64,
    pub question_type: String,
    pub stem: String,
    pub options: Vec<QuestionOption>,
    pub answer: Option<String>,
    pub analysis: Option<String>,
    pub difficulty: String,
    pub display_order: i64,
    pub score: i64,
}

impl From<ExamQuestionRow> for ExamQuestionView {
    fn from(row: ExamQuestionRow) -> Self {
        // Options are stored as a JSON array column; a corrupt value
        // degrades to an empty list rather than failing the whole fetch
        let options: Vec<QuestionOption> =
            serde_json::from_str(&row.options).unwrap_or_default();
        Self {
            id: row.id,
            question_type: row.question_type,
            stem: row.stem,
            options,
            answer: row.answer,
            analysis: row.analysis,
            difficulty: row.difficulty,
            display_order: row.display_order,
            score: row.score,
        }
    }
}

/// Hydrated exam response: exam fields plus the ordered question list
#[derive(Debug, Clone, Serialize)]
pub struct ExamResponse {
    pub id: i64,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    pub is_public: bool,
    pub owner_user_id: i64,
    pub created_at: String,
    pub questions: Vec<ExamQuestionView>,
}

impl ExamResponse {
    pub fn from_parts(exam: Exam, questions: Vec<ExamQuestionView>) -> Self {
        Self {
            id: exam.id,
            name: exam.name,
            summary: exam.summary,
            description: exam.description,
            category_id: exam.category_id,
            sub_category_id: exam.sub_category_id,
            is_public: exam.is_public != 0,
            owner_user_id: exam.owner_user_id,
            created_at: exam.created_at,
            questions,
        }
    }
}
