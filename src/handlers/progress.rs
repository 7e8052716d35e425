// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    handlers::course::ActivityPath,
    models::{
        completion::{CompletionRecord, QuizScore, SubmitQuizRequest},
        course::{ActivityKind, Course},
    },
    progression::{CourseProgress, Navigation, compute_completion, index_records, resolve_next, resolver::locate},
    utils::jwt::Claims,
};

/// Response to a completion command.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompletionResponse {
    pub completed: CompletionRecord,
    /// False when the activity had already been completed.
    pub newly_completed: bool,
    pub next: Navigation,
    /// Course progress recomputed after the write.
    pub progress: CourseProgress,
}

async fn progress_for(pool: &SqlitePool, course: &Course, user_id: i64) -> Result<CourseProgress, AppError> {
    let records = db::completion::fetch_completion_records(pool, user_id, course.id).await?;
    Ok(compute_completion(course, &index_records(records)))
}

/// Locates the activity, checks its kind and records the completion.
async fn complete_activity(
    pool: &SqlitePool,
    claims: &Claims,
    path: &ActivityPath,
    expected: ActivityKind,
    score: Option<QuizScore>,
) -> Result<(StatusCode, Json<CompletionResponse>), AppError> {
    let user_id = claims.user_id()?;
    let course = db::course::fetch_course_tree(pool, &path.course).await?;
    let stop = locate(&course, path.position())?;

    if stop.activity.kind != expected {
        let msg = match stop.activity.kind {
            ActivityKind::Article => "Articles are completed by viewing them",
            ActivityKind::Quiz => "Quizzes are completed by submitting answers",
        };
        return Err(AppError::BadRequest(msg.to_string()));
    }

    let outcome = db::completion::write_completion_record(pool, user_id, stop.activity.id, score).await?;
    let next = resolve_next(&course, path.position())?;
    let progress = progress_for(pool, &course, user_id).await?;

    let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(CompletionResponse {
            completed: outcome.record,
            newly_completed: outcome.created,
            next,
            progress,
        }),
    ))
}

/// Records that the caller viewed an article.
///
/// The page layer calls this when a logged-in learner opens an article.
/// Repeat views are no-ops that return the original record.
#[utoipa::path(
    post,
    path = "/api/courses/{course}/modules/{module}/lessons/{lesson}/activities/{activity}/view",
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = String, Path, description = "Module slug"),
        ("lesson" = String, Path, description = "Lesson slug"),
        ("activity" = String, Path, description = "Activity slug")
    ),
    responses(
        (status = 201, description = "Article completed", body = CompletionResponse),
        (status = 200, description = "Article was already complete", body = CompletionResponse),
        (status = 400, description = "Activity is a quiz"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown activity")
    )
)]
pub async fn record_view(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(path): Path<ActivityPath>,
) -> Result<impl IntoResponse, AppError> {
    complete_activity(&pool, &claims, &path, ActivityKind::Article, None).await
}

/// Records a finished quiz with its score.
///
/// The first submission wins; later submissions return the stored score.
#[utoipa::path(
    post,
    path = "/api/courses/{course}/modules/{module}/lessons/{lesson}/activities/{activity}/submit",
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = String, Path, description = "Module slug"),
        ("lesson" = String, Path, description = "Lesson slug"),
        ("activity" = String, Path, description = "Activity slug")
    ),
    request_body = SubmitQuizRequest,
    responses(
        (status = 201, description = "Quiz completed", body = CompletionResponse),
        (status = 200, description = "Quiz was already complete", body = CompletionResponse),
        (status = 400, description = "Malformed body, invalid score or activity is an article"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown activity")
    )
)]
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(path): Path<ActivityPath>,
    payload: Result<Json<SubmitQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    complete_activity(&pool, &claims, &path, ActivityKind::Quiz, Some(QuizScore::from(&req))).await
}

/// The caller's completion state across a whole course.
#[utoipa::path(
    get,
    path = "/api/courses/{course}/progress",
    params(("course" = String, Path, description = "Course slug")),
    responses(
        (status = 200, description = "Annotated course tree", body = CourseProgress),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown course")
    )
)]
pub async fn get_progress(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(course_slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let course = db::course::fetch_course_tree(&pool, &course_slug).await?;
    let progress = progress_for(&pool, &course, user_id).await?;

    Ok(Json(progress))
}
