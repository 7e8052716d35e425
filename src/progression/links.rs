// src/progression/links.rs

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::course::{Activity, Course, Lesson, Module};

/// How far a navigation step moves through the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NavKind {
    /// Another activity in the same lesson.
    Activity,
    /// The first (or last) activity of another lesson in the same module.
    Lesson,
    /// An activity in another module.
    Module,
    /// The course root: nothing is left to do.
    Course,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => f.write_str("Next"),
            Direction::Previous => f.write_str("Previous"),
        }
    }
}

/// Slugs identifying an activity inside its course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActivityRef {
    pub activity_id: i64,
    pub module_slug: String,
    pub lesson_slug: String,
    pub activity_slug: String,
}

/// A link the UI can render: always a valid href and a non-empty label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Navigation {
    pub kind: NavKind,
    pub href: String,
    pub label: String,
    /// Target activity; `None` when the link points at the course root.
    pub target: Option<ActivityRef>,
}

pub const ALL_DONE_LABEL: &str = "All Done!";
pub const START_LABEL: &str = "Start Course";

pub fn course_href(course_slug: &str) -> String {
    format!("/courses/{}", course_slug)
}

pub fn activity_href(course_slug: &str, module_slug: &str, lesson_slug: &str, activity_slug: &str) -> String {
    format!(
        "/courses/{}/{}/{}/{}",
        course_slug, module_slug, lesson_slug, activity_slug
    )
}

/// Label for a step of the given kind.
///
/// `Activity` steps name the activity type, `Lesson` and `Module` steps name
/// the order number of the container being entered.
pub fn step_label(direction: Direction, kind: NavKind, module: &Module, lesson: &Lesson, activity: &Activity) -> String {
    match kind {
        NavKind::Activity => format!("{}: {}", direction, activity.kind),
        NavKind::Lesson => format!("{}: Lesson {}", direction, lesson.order),
        NavKind::Module => format!("{}: Module {}", direction, module.order),
        NavKind::Course => ALL_DONE_LABEL.to_string(),
    }
}

impl Navigation {
    /// Link to a specific activity.
    pub fn to_activity(
        course: &Course,
        module: &Module,
        lesson: &Lesson,
        activity: &Activity,
        kind: NavKind,
        label: String,
    ) -> Self {
        Navigation {
            kind,
            href: activity_href(&course.slug, &module.slug, &lesson.slug, &activity.slug),
            label,
            target: Some(ActivityRef {
                activity_id: activity.id,
                module_slug: module.slug.clone(),
                lesson_slug: lesson.slug.clone(),
                activity_slug: activity.slug.clone(),
            }),
        }
    }

    /// Terminal state: back to the course root.
    pub fn all_done(course: &Course) -> Self {
        Navigation {
            kind: NavKind::Course,
            href: course_href(&course.slug),
            label: ALL_DONE_LABEL.to_string(),
            target: None,
        }
    }
}
