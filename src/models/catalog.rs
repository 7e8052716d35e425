// src/models/catalog.rs

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::course::ActivityKind;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Top-level shape of a course catalogue import file.
///
/// ```json
/// { "courses": [ { "slug": "budgeting", "title": "Budgeting", "modules": [ ... ] } ] }
/// ```
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_course_slugs))]
pub struct CatalogFile {
    #[validate(nested)]
    pub courses: Vec<CourseSeed>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_course_orders))]
pub struct CourseSeed {
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub modules: Vec<ModuleSeed>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_module_orders))]
pub struct ModuleSeed {
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub order: i64,
    #[serde(default)]
    #[validate(nested)]
    pub lessons: Vec<LessonSeed>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_lesson_orders))]
pub struct LessonSeed {
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub order: i64,
    #[serde(default)]
    #[validate(nested)]
    pub activities: Vec<ActivitySeed>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActivitySeed {
    #[validate(length(min = 1, max = 100), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub kind: ActivityKind,
    pub order: i64,
    #[validate(length(max = 100000))]
    pub body: Option<String>,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if !SLUG_RE.is_match(slug) {
        return Err(ValidationError::new("invalid_slug"));
    }
    Ok(())
}

/// Slugs and orders must both be unique among siblings.
fn check_siblings<'a>(
    items: impl Iterator<Item = (&'a str, i64)>,
) -> Result<(), ValidationError> {
    let mut slugs = HashSet::new();
    let mut orders = HashSet::new();
    for (slug, order) in items {
        if !slugs.insert(slug) {
            return Err(ValidationError::new("duplicate_slug"));
        }
        if !orders.insert(order) {
            return Err(ValidationError::new("duplicate_order"));
        }
    }
    Ok(())
}

fn validate_course_slugs(catalog: &CatalogFile) -> Result<(), ValidationError> {
    let mut slugs = HashSet::new();
    if catalog.courses.iter().all(|c| slugs.insert(c.slug.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_course_slug"))
    }
}

fn validate_course_orders(course: &CourseSeed) -> Result<(), ValidationError> {
    check_siblings(course.modules.iter().map(|m| (m.slug.as_str(), m.order)))
}

fn validate_module_orders(module: &ModuleSeed) -> Result<(), ValidationError> {
    check_siblings(module.lessons.iter().map(|l| (l.slug.as_str(), l.order)))
}

fn validate_lesson_orders(lesson: &LessonSeed) -> Result<(), ValidationError> {
    check_siblings(lesson.activities.iter().map(|a| (a.slug.as_str(), a.order)))
}
