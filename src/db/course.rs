// src/db/course.rs

use std::collections::HashMap;

use sqlx::{FromRow, SqlitePool};

use crate::{
    error::AppError,
    models::course::{Activity, ActivityKind, Course, CourseSummary, Lesson, Module},
    progression::NotFound,
};

#[derive(FromRow)]
struct CourseRow {
    id: i64,
    slug: String,
    title: String,
    description: Option<String>,
}

#[derive(FromRow)]
struct ModuleRow {
    id: i64,
    slug: String,
    title: String,
    order: i64,
}

#[derive(FromRow)]
struct LessonRow {
    id: i64,
    module_id: i64,
    slug: String,
    title: String,
    order: i64,
}

#[derive(FromRow)]
struct ActivityRow {
    id: i64,
    lesson_id: i64,
    slug: String,
    title: String,
    kind: String,
    order: i64,
    body: Option<String>,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<ActivityKind>()
            .map_err(AppError::InternalServerError)?;
        Ok(Activity {
            id: row.id,
            slug: row.slug,
            title: row.title,
            kind,
            order: row.order,
            body: row.body,
        })
    }
}

/// Lists every course with module and activity counts.
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<CourseSummary>, AppError> {
    let courses = sqlx::query_as::<_, CourseSummary>(
        r#"
        SELECT
            c.id,
            c.slug,
            c.title,
            c.description,
            (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS module_count,
            (SELECT COUNT(*)
               FROM activities a
               JOIN lessons l ON a.lesson_id = l.id
               JOIN modules m ON l.module_id = m.id
              WHERE m.course_id = c.id) AS activity_count
        FROM courses c
        ORDER BY c.title
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::from(e)
    })?;

    Ok(courses)
}

/// Loads the full Course → Module → Lesson → Activity tree for `course_slug`.
///
/// Three flat queries are grouped in memory; the result is normalized so
/// children are sorted by `order`.
pub async fn fetch_course_tree(pool: &SqlitePool, course_slug: &str) -> Result<Course, AppError> {
    let course = sqlx::query_as::<_, CourseRow>(
        "SELECT id, slug, title, description FROM courses WHERE slug = ?",
    )
    .bind(course_slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| NotFound::Course(course_slug.to_string()))?;

    let modules = sqlx::query_as::<_, ModuleRow>(
        r#"SELECT id, slug, title, "order" FROM modules WHERE course_id = ?"#,
    )
    .bind(course.id)
    .fetch_all(pool)
    .await?;

    let lessons = sqlx::query_as::<_, LessonRow>(
        r#"
        SELECT l.id, l.module_id, l.slug, l.title, l."order"
        FROM lessons l
        JOIN modules m ON l.module_id = m.id
        WHERE m.course_id = ?
        "#,
    )
    .bind(course.id)
    .fetch_all(pool)
    .await?;

    let activities = sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT a.id, a.lesson_id, a.slug, a.title, a.kind, a."order", a.body
        FROM activities a
        JOIN lessons l ON a.lesson_id = l.id
        JOIN modules m ON l.module_id = m.id
        WHERE m.course_id = ?
        "#,
    )
    .bind(course.id)
    .fetch_all(pool)
    .await?;

    let mut activities_by_lesson: HashMap<i64, Vec<Activity>> = HashMap::new();
    for row in activities {
        let lesson_id = row.lesson_id;
        activities_by_lesson
            .entry(lesson_id)
            .or_default()
            .push(Activity::try_from(row)?);
    }

    let mut lessons_by_module: HashMap<i64, Vec<Lesson>> = HashMap::new();
    for row in lessons {
        lessons_by_module.entry(row.module_id).or_default().push(Lesson {
            id: row.id,
            slug: row.slug,
            title: row.title,
            order: row.order,
            activities: activities_by_lesson.remove(&row.id).unwrap_or_default(),
        });
    }

    let modules = modules
        .into_iter()
        .map(|row| Module {
            id: row.id,
            slug: row.slug,
            title: row.title,
            order: row.order,
            lessons: lessons_by_module.remove(&row.id).unwrap_or_default(),
        })
        .collect();

    let mut course = Course {
        id: course.id,
        slug: course.slug,
        title: course.title,
        description: course.description,
        modules,
    };
    course.normalize();

    tracing::debug!(
        course = %course.slug,
        activities = course.activity_count(),
        "Loaded course tree"
    );

    Ok(course)
}
