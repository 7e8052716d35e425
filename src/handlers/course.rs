// src/handlers/course.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::{
    db,
    error::AppError,
    models::course::{Activity, Course, CourseSummary},
    progression::{Navigation, Position, first_activity, resolve_next, resolve_previous, resolver::locate},
};

/// Path segments addressing one activity.
#[derive(Debug, Deserialize)]
pub struct ActivityPath {
    pub course: String,
    pub module: String,
    pub lesson: String,
    pub activity: String,
}

impl ActivityPath {
    pub fn position(&self) -> Position<'_> {
        Position {
            module: &self.module,
            lesson: &self.lesson,
            activity: &self.activity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseRef {
    pub slug: String,
    pub title: String,
}

/// Slug, title and order of a container on the way to an activity.
#[derive(Debug, Serialize, ToSchema)]
pub struct Breadcrumb {
    pub slug: String,
    pub title: String,
    pub order: i64,
}

/// A course tree plus the link that starts it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub start: Option<Navigation>,
}

/// Everything an activity page needs: the activity, where it sits and where
/// the learner can go from it.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityView {
    pub course: CourseRef,
    pub module: Breadcrumb,
    pub lesson: Breadcrumb,
    pub activity: Activity,
    pub next: Navigation,
    pub previous: Option<Navigation>,
}

/// Lists all courses.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, description = "Course catalogue", body = [CourseSummary]))
)]
pub async fn list_courses(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let courses = db::course::list_courses(&pool).await?;
    Ok(Json(courses))
}

/// Retrieves a course with its ordered modules, lessons and activities.
#[utoipa::path(
    get,
    path = "/api/courses/{course}",
    params(("course" = String, Path, description = "Course slug")),
    responses(
        (status = 200, description = "Course tree", body = CourseDetail),
        (status = 404, description = "Unknown course")
    )
)]
pub async fn get_course(
    State(pool): State<SqlitePool>,
    Path(course_slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = db::course::fetch_course_tree(&pool, &course_slug).await?;
    let start = first_activity(&course);

    Ok(Json(CourseDetail { course, start }))
}

/// Retrieves one activity with its next/previous navigation.
///
/// Read-only: recording an article view is a separate `POST .../view`.
#[utoipa::path(
    get,
    path = "/api/courses/{course}/modules/{module}/lessons/{lesson}/activities/{activity}",
    params(
        ("course" = String, Path, description = "Course slug"),
        ("module" = String, Path, description = "Module slug"),
        ("lesson" = String, Path, description = "Lesson slug"),
        ("activity" = String, Path, description = "Activity slug")
    ),
    responses(
        (status = 200, description = "Activity with navigation", body = ActivityView),
        (status = 404, description = "Unknown course, module, lesson or activity")
    )
)]
pub async fn get_activity(
    State(pool): State<SqlitePool>,
    Path(path): Path<ActivityPath>,
) -> Result<impl IntoResponse, AppError> {
    let course = db::course::fetch_course_tree(&pool, &path.course).await?;
    let stop = locate(&course, path.position())?;

    let next = resolve_next(&course, path.position())?;
    let previous = resolve_previous(&course, path.position())?;

    Ok(Json(ActivityView {
        course: CourseRef {
            slug: course.slug.clone(),
            title: course.title.clone(),
        },
        module: Breadcrumb {
            slug: stop.module.slug.clone(),
            title: stop.module.title.clone(),
            order: stop.module.order,
        },
        lesson: Breadcrumb {
            slug: stop.lesson.slug.clone(),
            title: stop.lesson.title.clone(),
            order: stop.lesson.order,
        },
        activity: stop.activity.clone(),
        next,
        previous,
    }))
}
