// src/db/completion.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::completion::{CompletionRecord, QuizScore},
};

/// Result of recording a completion.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The stored record. On a repeat call this is the original record.
    pub record: CompletionRecord,
    /// Whether this call created the record.
    pub created: bool,
}

/// Fetches every completion record `user_id` holds for activities of `course_id`.
pub async fn fetch_completion_records(
    pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> Result<Vec<CompletionRecord>, AppError> {
    let records = sqlx::query_as::<_, CompletionRecord>(
        r#"
        SELECT ac.user_id, ac.activity_id, ac.completed_at, ac.correct_answers, ac.total_questions
        FROM activity_completions ac
        JOIN activities a ON ac.activity_id = a.id
        JOIN lessons l ON a.lesson_id = l.id
        JOIN modules m ON l.module_id = m.id
        WHERE ac.user_id = ? AND m.course_id = ?
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch completion records: {:?}", e);
        AppError::from(e)
    })?;

    Ok(records)
}

/// Marks `activity_id` complete for `user_id`.
///
/// Idempotent: the UNIQUE (user_id, activity_id) constraint collapses repeat
/// and concurrent calls into one row, and an existing row is never touched,
/// so `completed_at` and the score keep their first values.
pub async fn write_completion_record(
    pool: &SqlitePool,
    user_id: i64,
    activity_id: i64,
    score: Option<QuizScore>,
) -> Result<WriteOutcome, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO activity_completions
            (user_id, activity_id, completed_at, correct_answers, total_questions)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, activity_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(activity_id)
    .bind(Utc::now())
    .bind(score.map(|s| s.correct_answers))
    .bind(score.map(|s| s.total_questions))
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to write completion record: {:?}", e);
        AppError::from(e)
    })?;

    let created = result.rows_affected() == 1;

    let record = sqlx::query_as::<_, CompletionRecord>(
        r#"
        SELECT user_id, activity_id, completed_at, correct_answers, total_questions
        FROM activity_completions
        WHERE user_id = ? AND activity_id = ?
        "#,
    )
    .bind(user_id)
    .bind(activity_id)
    .fetch_one(pool)
    .await?;

    if created {
        tracing::info!(user_id, activity_id, "Activity completed");
    } else {
        tracing::debug!(user_id, activity_id, "Activity already complete");
    }

    Ok(WriteOutcome { record, created })
}
