// src/progression/completion.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    completion::CompletionRecord,
    course::{Activity, ActivityKind, Course, Lesson, Module},
};

use super::{
    links::{NavKind, Navigation, activity_href},
    resolver::stops,
};

pub const RESUME_LABEL: &str = "Continue";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityProgress {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub kind: ActivityKind,
    pub order: i64,
    pub href: String,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Percentage of correct answers, quizzes only.
    pub accuracy: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonProgress {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub order: i64,
    pub is_complete: bool,
    pub completed_activities: usize,
    pub total_activities: usize,
    pub accuracy: Option<i64>,
    pub activities: Vec<ActivityProgress>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleProgress {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub order: i64,
    pub is_complete: bool,
    pub completed_activities: usize,
    pub total_activities: usize,
    pub accuracy: Option<i64>,
    pub lessons: Vec<LessonProgress>,
}

/// A course tree annotated with one user's completion state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgress {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub is_complete: bool,
    pub completed_activities: usize,
    pub total_activities: usize,
    pub percent_complete: i64,
    pub accuracy: Option<i64>,
    /// First incomplete activity, in course order.
    pub resume: Option<Navigation>,
    pub modules: Vec<ModuleProgress>,
}

/// `round(part / whole * 100)`, or `None` when `whole` is not positive.
pub fn percentage(part: i64, whole: i64) -> Option<i64> {
    if whole <= 0 {
        return None;
    }
    Some(((part as f64 / whole as f64) * 100.0).round() as i64)
}

/// Quiz accuracy from an optional score pair.
pub fn accuracy(correct_answers: Option<i64>, total_questions: Option<i64>) -> Option<i64> {
    match (correct_answers, total_questions) {
        (Some(correct), Some(total)) => percentage(correct, total),
        _ => None,
    }
}

/// Summed quiz answers used for lesson/module/course accuracy.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    correct: i64,
    total: i64,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.correct += other.correct;
        self.total += other.total;
    }

    fn accuracy(&self) -> Option<i64> {
        percentage(self.correct, self.total)
    }
}

/// Indexes one user's records by activity id.
pub fn index_records(records: Vec<CompletionRecord>) -> HashMap<i64, CompletionRecord> {
    records.into_iter().map(|r| (r.activity_id, r)).collect()
}

fn activity_progress(
    course: &Course,
    module: &Module,
    lesson: &Lesson,
    activity: &Activity,
    records: &HashMap<i64, CompletionRecord>,
) -> (ActivityProgress, Tally) {
    let record = records.get(&activity.id);

    let (accuracy, tally) = match activity.kind {
        ActivityKind::Article => (None, Tally::default()),
        ActivityKind::Quiz => match record {
            Some(r) => {
                let tally = match (r.correct_answers, r.total_questions) {
                    (Some(correct), Some(total)) if total > 0 => Tally { correct, total },
                    _ => Tally::default(),
                };
                (accuracy(r.correct_answers, r.total_questions), tally)
            }
            None => (None, Tally::default()),
        },
    };

    let progress = ActivityProgress {
        id: activity.id,
        slug: activity.slug.clone(),
        title: activity.title.clone(),
        kind: activity.kind,
        order: activity.order,
        href: activity_href(&course.slug, &module.slug, &lesson.slug, &activity.slug),
        is_complete: record.is_some(),
        completed_at: record.map(|r| r.completed_at),
        accuracy,
    };
    (progress, tally)
}

fn lesson_progress(
    course: &Course,
    module: &Module,
    lesson: &Lesson,
    records: &HashMap<i64, CompletionRecord>,
) -> (LessonProgress, Tally) {
    let mut tally = Tally::default();
    let activities: Vec<ActivityProgress> = lesson
        .activities
        .iter()
        .map(|a| {
            let (progress, t) = activity_progress(course, module, lesson, a, records);
            tally.add(t);
            progress
        })
        .collect();

    let completed = activities.iter().filter(|a| a.is_complete).count();
    let progress = LessonProgress {
        id: lesson.id,
        slug: lesson.slug.clone(),
        title: lesson.title.clone(),
        order: lesson.order,
        // An empty lesson has nothing left to do.
        is_complete: completed == activities.len(),
        completed_activities: completed,
        total_activities: activities.len(),
        accuracy: tally.accuracy(),
        activities,
    };
    (progress, tally)
}

fn module_progress(
    course: &Course,
    module: &Module,
    records: &HashMap<i64, CompletionRecord>,
) -> (ModuleProgress, Tally) {
    let mut tally = Tally::default();
    let lessons: Vec<LessonProgress> = module
        .lessons
        .iter()
        .map(|l| {
            let (progress, t) = lesson_progress(course, module, l, records);
            tally.add(t);
            progress
        })
        .collect();

    let progress = ModuleProgress {
        id: module.id,
        slug: module.slug.clone(),
        title: module.title.clone(),
        order: module.order,
        is_complete: lessons.iter().all(|l| l.is_complete),
        completed_activities: lessons.iter().map(|l| l.completed_activities).sum(),
        total_activities: lessons.iter().map(|l| l.total_activities).sum(),
        accuracy: tally.accuracy(),
        lessons,
    };
    (progress, tally)
}

/// Derives completion flags bottom-up from one user's records.
///
/// Pure: the records are a snapshot fetched by the caller. Records for
/// activities outside this course are ignored.
pub fn compute_completion(course: &Course, records: &HashMap<i64, CompletionRecord>) -> CourseProgress {
    let mut tally = Tally::default();
    let modules: Vec<ModuleProgress> = course
        .modules
        .iter()
        .map(|m| {
            let (progress, t) = module_progress(course, m, records);
            tally.add(t);
            progress
        })
        .collect();

    let completed: usize = modules.iter().map(|m| m.completed_activities).sum();
    let total: usize = modules.iter().map(|m| m.total_activities).sum();

    let resume = stops(course)
        .into_iter()
        .find(|s| !records.contains_key(&s.activity.id))
        .map(|s| {
            let label = format!("{}: {}", RESUME_LABEL, s.activity.kind);
            Navigation::to_activity(course, s.module, s.lesson, s.activity, NavKind::Activity, label)
        });

    CourseProgress {
        id: course.id,
        slug: course.slug.clone(),
        title: course.title.clone(),
        is_complete: modules.iter().all(|m| m.is_complete),
        completed_activities: completed,
        total_activities: total,
        percent_complete: percentage(completed as i64, total as i64).unwrap_or(0),
        accuracy: tally.accuracy(),
        resume,
        modules,
    }
}
