// src/services/questions.rs
//! Normalization of raw spreadsheet rows into typed question records.
//!
//! Type and difficulty are inferred from free text, so matching is by
//! substring containment and tolerant of minor variation. Rows that cannot
//! become a usable question are reported as skips, not errors; the caller
//! decides what an import with zero surviving rows means.

use std::fmt;

use crate::exams::models::{Difficulty, ParsedQuestionRecord, QuestionOption, QuestionType};
use crate::services::workbook::RawRow;

/// Every imported question is worth one point; this format version has no
/// per-row score column.
const DEFAULT_SCORE: i64 = 1;

const OPTION_KEYS: [&str; 4] = ["A", "B", "C", "D"];

/// Why a row was dropped during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingStem,
    ChoiceWithoutOptions,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingStem => write!(f, "missing stem"),
            SkipReason::ChoiceWithoutOptions => write!(f, "choice question without options"),
        }
    }
}

/// Outcome of normalizing one raw row
#[derive(Debug)]
pub enum RowOutcome {
    Parsed(ParsedQuestionRecord),
    Skipped {
        display_order: i64,
        reason: SkipReason,
    },
}

/// Infer the question type from free text.
///
/// Recognizes the original Chinese keywords and their English equivalents;
/// anything unrecognized is a single-choice question.
pub fn infer_question_type(text: &str) -> QuestionType {
    let lower = text.to_lowercase();
    if lower.contains("多选") || lower.contains("multiple") {
        QuestionType::MultipleChoice
    } else if lower.contains("判断")
        || lower.contains("true/false")
        || lower.contains("true-false")
        || lower.contains("true or false")
    {
        QuestionType::TrueFalse
    } else if lower.contains("填空") || lower.contains("fill") {
        QuestionType::FillBlank
    } else {
        QuestionType::SingleChoice
    }
}

/// Map free-text difficulty onto the ordinal scale, defaulting to easy.
///
/// Unrecognized text (including blank) deliberately lands on easy; the
/// import format treats the difficulty column as advisory.
pub fn map_difficulty(text: &str) -> Difficulty {
    match text.trim().to_lowercase().as_str() {
        "难" | "hard" => Difficulty::Hard,
        "中" | "medium" => Difficulty::Medium,
        _ => Difficulty::Easy,
    }
}

/// Turn one raw row into a validated question record, or a skip.
pub fn normalize(row: &RawRow) -> RowOutcome {
    if row.stem.trim().is_empty() {
        return RowOutcome::Skipped {
            display_order: row.display_order,
            reason: SkipReason::MissingStem,
        };
    }

    let question_type = infer_question_type(&row.type_text);
    let options = assemble_options(&row.options);

    if question_type.is_choice() && options.is_empty() {
        return RowOutcome::Skipped {
            display_order: row.display_order,
            reason: SkipReason::ChoiceWithoutOptions,
        };
    }

    RowOutcome::Parsed(ParsedQuestionRecord {
        question_type,
        stem: row.stem.trim().to_string(),
        options,
        answer: row.answer.trim().to_string(),
        analysis: row.analysis.trim().to_string(),
        difficulty: map_difficulty(&row.difficulty_text),
        display_order: row.display_order,
        score: DEFAULT_SCORE,
    })
}

/// Pair populated option cells with their letter keys in fixed A–D order;
/// empty cells are omitted without a placeholder.
fn assemble_options(cells: &[String; 4]) -> Vec<QuestionOption> {
    OPTION_KEYS
        .iter()
        .zip(cells.iter())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| QuestionOption {
            key: key.to_string(),
            value: value.trim().to_string(),
        })
        .collect()
}
