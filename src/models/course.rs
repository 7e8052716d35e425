// src/models/course.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// The two kinds of activity a lesson can contain.
///
/// Stored as lowercase text (`article`, `quiz`) and displayed capitalized in
/// navigation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Article,
    Quiz,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Article => "article",
            ActivityKind::Quiz => "quiz",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Article => f.write_str("Article"),
            ActivityKind::Quiz => f.write_str("Quiz"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Ok(ActivityKind::Article),
            "quiz" => Ok(ActivityKind::Quiz),
            other => Err(format!("unknown activity kind '{}'", other)),
        }
    }
}

/// A single unit of learning: an article to read or a quiz to take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Activity {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub kind: ActivityKind,
    pub order: i64,

    /// Sanitized HTML body, only present for articles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub order: i64,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Module {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub order: i64,
    pub lessons: Vec<Lesson>,
}

/// A full course tree. Children at every level are kept sorted by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub modules: Vec<Module>,
}

impl Course {
    /// Sorts modules, lessons and activities by their `order` field.
    ///
    /// Every traversal in `progression` relies on this; trees built by the
    /// store are normalized before they are returned.
    pub fn normalize(&mut self) {
        self.modules.sort_by_key(|m| m.order);
        for module in &mut self.modules {
            module.lessons.sort_by_key(|l| l.order);
            for lesson in &mut module.lessons {
                lesson.activities.sort_by_key(|a| a.order);
            }
        }
    }

    pub fn module(&self, slug: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.slug == slug)
    }

    pub fn activity_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| &m.lessons)
            .map(|l| l.activities.len())
            .sum()
    }
}

impl Module {
    pub fn lesson(&self, slug: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.slug == slug)
    }
}

impl Lesson {
    pub fn activity(&self, slug: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.slug == slug)
    }
}

/// Catalogue entry returned by the course listing.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CourseSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub module_count: i64,
    pub activity_count: i64,
}
