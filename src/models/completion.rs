// src/models/completion.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'activity_completions' table in the database.
/// Existence of a row means the user finished the activity.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct CompletionRecord {
    pub user_id: i64,
    pub activity_id: i64,
    pub completed_at: DateTime<Utc>,

    /// Quiz score, absent for articles.
    pub correct_answers: Option<i64>,
    pub total_questions: Option<i64>,
}

/// Score attached to a quiz completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct_answers: i64,
    pub total_questions: i64,
}

/// DTO for submitting a finished quiz.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = validate_score))]
pub struct SubmitQuizRequest {
    #[validate(range(min = 0, max = 1000))]
    pub correct_answers: i64,
    #[validate(range(min = 0, max = 1000))]
    pub total_questions: i64,
}

fn validate_score(req: &SubmitQuizRequest) -> Result<(), validator::ValidationError> {
    if req.correct_answers > req.total_questions {
        return Err(validator::ValidationError::new("correct_exceeds_total"));
    }
    Ok(())
}

impl From<&SubmitQuizRequest> for QuizScore {
    fn from(req: &SubmitQuizRequest) -> Self {
        QuizScore {
            correct_answers: req.correct_answers,
            total_questions: req.total_questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_quiz_request_validation() {
        let ok = SubmitQuizRequest { correct_answers: 8, total_questions: 10 };
        assert!(ok.validate().is_ok());

        let empty = SubmitQuizRequest { correct_answers: 0, total_questions: 0 };
        assert!(empty.validate().is_ok());

        let too_many = SubmitQuizRequest { correct_answers: 11, total_questions: 10 };
        assert!(too_many.validate().is_err());

        let negative = SubmitQuizRequest { correct_answers: -1, total_questions: 10 };
        assert!(negative.validate().is_err());
    }
}
