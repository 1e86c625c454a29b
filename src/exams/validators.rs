use super::models::CreateExamRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateExamRequest> for CreateExamRequest {
    fn validate(&self, data: &CreateExamRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Exam name is required");
        }

        if data.name.chars().count() > 100 {
            result.add_error("name", "Exam name must not exceed 100 characters");
        }

        if let Some(summary) = &data.summary {
            if summary.chars().count() > 500 {
                result.add_error("summary", "Summary must not exceed 500 characters");
            }
        }

        if data.category_id <= 0 {
            result.add_error("category_id", "Category id must be a positive integer");
        }

        if let Some(sub_category_id) = data.sub_category_id {
            if sub_category_id <= 0 {
                result.add_error(
                    "sub_category_id",
                    "Subcategory id must be a positive integer",
                );
            }
        }

        if data.owner_user_id <= 0 {
            result.add_error("owner_user_id", "Owner user id must be a positive integer");
        }

        result
    }
}
