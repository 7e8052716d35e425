// src/db/seed.rs

use std::path::Path;

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        catalog::{CatalogFile, CourseSeed},
        course::ActivityKind,
    },
    utils::html::clean_html,
};

/// Counts of rows written by an import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub courses: usize,
    pub modules: usize,
    pub lessons: usize,
    pub activities: usize,
    /// Stale modules, lessons and activities deleted by the import.
    pub removed: u64,
}

/// Reads and validates a catalogue file.
pub async fn load_catalog_file(path: impl AsRef<Path>) -> Result<CatalogFile, AppError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::InternalServerError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let catalog: CatalogFile = serde_json::from_str(&raw)?;
    catalog.validate()?;
    Ok(catalog)
}

/// Upserts every course of the catalogue, keyed by slug at each level.
///
/// Within an imported course the file is authoritative: modules, lessons and
/// activities it no longer lists are deleted, together with completion
/// records that point at them. Courses absent from the file are untouched.
/// The whole import runs in one transaction.
pub async fn import_catalog(pool: &SqlitePool, catalog: &CatalogFile) -> Result<ImportSummary, AppError> {
    let mut tx = pool.begin().await?;
    let mut summary = ImportSummary::default();

    for course in &catalog.courses {
        import_course(&mut tx, course, &mut summary).await?;
    }

    tx.commit().await?;
    tracing::info!(
        courses = summary.courses,
        modules = summary.modules,
        lessons = summary.lessons,
        activities = summary.activities,
        removed = summary.removed,
        "Course catalogue imported"
    );
    Ok(summary)
}

async fn import_course(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    course: &CourseSeed,
    summary: &mut ImportSummary,
) -> Result<(), AppError> {
    let course_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO courses (slug, title, description) VALUES (?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET title = excluded.title, description = excluded.description
        RETURNING id
        "#,
    )
    .bind(&course.slug)
    .bind(&course.title)
    .bind(&course.description)
    .fetch_one(&mut **tx)
    .await?;
    summary.courses += 1;

    summary.removed += prune_children(
        tx,
        "modules",
        "course_id",
        course_id,
        course.modules.iter().map(|m| m.slug.as_str()),
    )
    .await?;

    for module in &course.modules {
        let module_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO modules (course_id, slug, title, "order") VALUES (?, ?, ?, ?)
            ON CONFLICT(course_id, slug) DO UPDATE SET title = excluded.title, "order" = excluded."order"
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(&module.slug)
        .bind(&module.title)
        .bind(module.order)
        .fetch_one(&mut **tx)
        .await?;
        summary.modules += 1;

        summary.removed += prune_children(
            tx,
            "lessons",
            "module_id",
            module_id,
            module.lessons.iter().map(|l| l.slug.as_str()),
        )
        .await?;

        for lesson in &module.lessons {
            let lesson_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO lessons (module_id, slug, title, "order") VALUES (?, ?, ?, ?)
                ON CONFLICT(module_id, slug) DO UPDATE SET title = excluded.title, "order" = excluded."order"
                RETURNING id
                "#,
            )
            .bind(module_id)
            .bind(&lesson.slug)
            .bind(&lesson.title)
            .bind(lesson.order)
            .fetch_one(&mut **tx)
            .await?;
            summary.lessons += 1;

            summary.removed += prune_children(
                tx,
                "activities",
                "lesson_id",
                lesson_id,
                lesson.activities.iter().map(|a| a.slug.as_str()),
            )
            .await?;

            for activity in &lesson.activities {
                let body = match activity.kind {
                    ActivityKind::Article => activity.body.as_deref().map(clean_html),
                    ActivityKind::Quiz => None,
                };

                sqlx::query(
                    r#"
                    INSERT INTO activities (lesson_id, slug, title, kind, "order", body) VALUES (?, ?, ?, ?, ?, ?)
                    ON CONFLICT(lesson_id, slug) DO UPDATE SET
                        title = excluded.title,
                        kind = excluded.kind,
                        "order" = excluded."order",
                        body = excluded.body
                    "#,
                )
                .bind(lesson_id)
                .bind(&activity.slug)
                .bind(&activity.title)
                .bind(activity.kind.as_str())
                .bind(activity.order)
                .bind(body)
                .execute(&mut **tx)
                .await?;
                summary.activities += 1;
            }
        }
    }

    Ok(())
}

/// Deletes the rows of `table` under `parent_id` whose slug is not in `keep`.
///
/// Runs before the siblings are upserted, so a stale row can never share an
/// order with a current one. Deletes cascade down the tree and into
/// `activity_completions`.
async fn prune_children<'a>(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    table: &'static str,
    parent_column: &'static str,
    parent_id: i64,
    keep: impl Iterator<Item = &'a str>,
) -> Result<u64, AppError> {
    let keep = serde_json::to_string(&keep.collect::<Vec<_>>())?;
    let sql = format!(
        "DELETE FROM {table} WHERE {parent_column} = ? AND slug NOT IN (SELECT value FROM json_each(?))"
    );

    let removed = sqlx::query(&sql)
        .bind(parent_id)
        .bind(keep)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if removed > 0 {
        tracing::info!(table, parent_id, removed, "Removed content missing from catalogue");
    }
    Ok(removed)
}
