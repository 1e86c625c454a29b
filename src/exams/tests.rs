//! Tests for exams module
//!
//! These tests verify core exam functionality including:
//! - Exam model structure
//! - Import request validation
//! - Hydrated response assembly

#[cfg(test)]
mod tests {
    use crate::common::Validator;
    use crate::exams::models::{
        CreateExamRequest, Exam, ExamQuestionRow, ExamQuestionView, ExamResponse, QuestionType,
    };

    fn valid_request() -> CreateExamRequest {
        CreateExamRequest {
            name: "Midterm".to_string(),
            summary: Some("Covers chapters 1-4".to_string()),
            description: None,
            category_id: 1,
            sub_category_id: Some(2),
            is_public: true,
            owner_user_id: 7,
        }
    }

    #[test]
    fn test_question_type_strings() {
        assert_eq!(QuestionType::SingleChoice.as_str(), "single_choice");
        assert_eq!(QuestionType::MultipleChoice.as_str(), "multiple_choice");
        assert_eq!(QuestionType::TrueFalse.as_str(), "true_false");
        assert_eq!(QuestionType::FillBlank.as_str(), "fill_blank");

        assert!(QuestionType::SingleChoice.is_choice());
        assert!(QuestionType::MultipleChoice.is_choice());
        assert!(!QuestionType::TrueFalse.is_choice());
        assert!(!QuestionType::FillBlank.is_choice());
    }

    #[test]
    fn test_create_exam_validation_success() {
        let request = valid_request();
        let result = request.validate(&request);
        assert!(result.is_valid, "Valid request should pass validation");
    }

    #[test]
    fn test_create_exam_validation_empty_name() {
        let mut request = valid_request();
        request.name = "  ".to_string();

        let result = request.validate(&request);
        assert!(!result.is_valid, "Blank name should fail validation");
        assert!(result.errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_create_exam_validation_name_too_long() {
        let mut request = valid_request();
        request.name = "x".repeat(101);

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_create_exam_validation_summary_too_long() {
        let mut request = valid_request();
        request.summary = Some("y".repeat(501));

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "summary"));
    }

    #[test]
    fn test_create_exam_validation_non_positive_ids() {
        let mut request = valid_request();
        request.category_id = 0;
        request.sub_category_id = Some(-3);
        request.owner_user_id = -1;

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "category_id"));
        assert!(result.errors.iter().any(|e| e.field == "sub_category_id"));
        assert!(result.errors.iter().any(|e| e.field == "owner_user_id"));
    }

    #[test]
    fn test_question_row_view_conversion() {
        let row = ExamQuestionRow {
            id: 5,
            question_type: "single_choice".to_string(),
            stem: "What is 2+2?".to_string(),
            options: r#"[{"key":"A","value":"3"},{"key":"B","value":"4"}]"#.to_string(),
            answer: Some("B".to_string()),
            analysis: None,
            difficulty: "easy".to_string(),
            display_order: 1,
            score: 1,
        };

        let view: ExamQuestionView = row.into();
        assert_eq!(view.options.len(), 2);
        assert_eq!(view.options[1].key, "B");
        assert_eq!(view.options[1].value, "4");
    }

    #[test]
    fn test_question_row_view_tolerates_corrupt_options() {
        let row = ExamQuestionRow {
            id: 5,
            question_type: "fill_blank".to_string(),
            stem: "____".to_string(),
            options: "not json".to_string(),
            answer: None,
            analysis: None,
            difficulty: "easy".to_string(),
            display_order: 1,
            score: 1,
        };

        let view: ExamQuestionView = row.into();
        assert!(view.options.is_empty());
    }

    #[test]
    fn test_exam_response_assembly() {
        let exam = Exam {
            id: 3,
            name: "Midterm".to_string(),
            summary: None,
            description: None,
            category_id: 1,
            sub_category_id: None,
            is_public: 1,
            owner_user_id: 7,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let response = ExamResponse::from_parts(exam, Vec::new());
        assert_eq!(response.id, 3);
        assert!(response.is_public);
        assert!(response.questions.is_empty());
    }
}
