// src/progression/resolver.rs

use std::{fmt, ptr};

use crate::models::course::{Activity, Course, Lesson, Module};

use super::links::{Direction, NavKind, Navigation, START_LABEL, step_label};

/// Where a learner currently is, by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    pub module: &'a str,
    pub lesson: &'a str,
    pub activity: &'a str,
}

/// A slug that does not exist at the named level of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Course(String),
    Module(String),
    Lesson(String),
    Activity(String),
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Course(slug) => write!(f, "Course '{}' not found", slug),
            NotFound::Module(slug) => write!(f, "Module '{}' not found", slug),
            NotFound::Lesson(slug) => write!(f, "Lesson '{}' not found", slug),
            NotFound::Activity(slug) => write!(f, "Activity '{}' not found", slug),
        }
    }
}

impl std::error::Error for NotFound {}

/// One activity together with its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct Stop<'c> {
    pub module: &'c Module,
    pub lesson: &'c Lesson,
    pub activity: &'c Activity,
}

/// Every activity of the course in (module, lesson, activity) order.
///
/// Empty lessons and modules contribute nothing, so they can never be a
/// navigation target. Assumes the course has been normalized.
pub fn stops(course: &Course) -> Vec<Stop<'_>> {
    course
        .modules
        .iter()
        .flat_map(|module| {
            module.lessons.iter().flat_map(move |lesson| {
                lesson.activities.iter().map(move |activity| Stop {
                    module,
                    lesson,
                    activity,
                })
            })
        })
        .collect()
}

/// Resolves `position` to a stop, reporting the first level that is missing.
pub fn locate<'c>(course: &'c Course, position: Position<'_>) -> Result<Stop<'c>, NotFound> {
    let module = course
        .module(position.module)
        .ok_or_else(|| NotFound::Module(position.module.to_string()))?;
    let lesson = module
        .lesson(position.lesson)
        .ok_or_else(|| NotFound::Lesson(position.lesson.to_string()))?;
    let activity = lesson
        .activity(position.activity)
        .ok_or_else(|| NotFound::Activity(position.activity.to_string()))?;

    Ok(Stop {
        module,
        lesson,
        activity,
    })
}

fn index_of(stops: &[Stop<'_>], current: &Stop<'_>) -> Option<usize> {
    stops
        .iter()
        .position(|s| ptr::eq(s.activity, current.activity))
}

/// Classifies the move from `from` to `to` by the highest level that changes.
fn step_kind(from: &Stop<'_>, to: &Stop<'_>) -> NavKind {
    if !ptr::eq(from.module, to.module) {
        NavKind::Module
    } else if !ptr::eq(from.lesson, to.lesson) {
        NavKind::Lesson
    } else {
        NavKind::Activity
    }
}

fn navigate(course: &Course, from: &Stop<'_>, to: &Stop<'_>, direction: Direction) -> Navigation {
    let kind = step_kind(from, to);
    let label = step_label(direction, kind, to.module, to.lesson, to.activity);
    Navigation::to_activity(course, to.module, to.lesson, to.activity, kind, label)
}

/// Computes the link that follows the activity at `position`.
///
/// Moves to the next activity of the lesson, else the first activity of the
/// next non-empty lesson, else the first activity of the next non-empty
/// module. Past the last activity of the course the result is the
/// "All Done!" link to the course root.
pub fn resolve_next(course: &Course, position: Position<'_>) -> Result<Navigation, NotFound> {
    let current = locate(course, position)?;
    let stops = stops(course);

    let next = index_of(&stops, &current).and_then(|idx| stops.get(idx + 1));

    Ok(match next {
        Some(to) => navigate(course, &current, to, Direction::Next),
        None => Navigation::all_done(course),
    })
}

/// Mirror of [`resolve_next`]. Crossing a lesson or module boundary lands on
/// the *last* activity of the previous container. Returns `None` at the first
/// activity of the course.
pub fn resolve_previous(course: &Course, position: Position<'_>) -> Result<Option<Navigation>, NotFound> {
    let current = locate(course, position)?;
    let stops = stops(course);

    let previous = index_of(&stops, &current)
        .and_then(|idx| idx.checked_sub(1))
        .and_then(|idx| stops.get(idx));

    Ok(previous.map(|to| navigate(course, &current, to, Direction::Previous)))
}

/// Link to the first activity of the course, or `None` if it has none.
pub fn first_activity(course: &Course) -> Option<Navigation> {
    stops(course).first().map(|s| {
        Navigation::to_activity(
            course,
            s.module,
            s.lesson,
            s.activity,
            NavKind::Activity,
            START_LABEL.to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::ActivityKind;
    use crate::progression::fixtures::{CourseBuilder, two_lesson_course};

    fn pos<'a>(module: &'a str, lesson: &'a str, activity: &'a str) -> Position<'a> {
        Position { module, lesson, activity }
    }

    #[test]
    fn test_next_within_lesson() {
        let course = two_lesson_course();
        let nav = resolve_next(&course, pos("m1", "l1", "a1")).unwrap();

        assert_eq!(nav.kind, NavKind::Activity);
        assert_eq!(nav.label, "Next: Quiz");
        assert_eq!(nav.href, "/courses/money/m1/l1/a2");
        assert_eq!(nav.target.unwrap().activity_slug, "a2");
    }

    #[test]
    fn test_next_crosses_lesson() {
        let course = two_lesson_course();
        let nav = resolve_next(&course, pos("m1", "l1", "a2")).unwrap();

        assert_eq!(nav.kind, NavKind::Lesson);
        assert_eq!(nav.label, "Next: Lesson 2");
        assert_eq!(nav.href, "/courses/money/m1/l2/a1");
    }

    #[test]
    fn test_last_activity_is_all_done() {
        let course = two_lesson_course();
        let nav = resolve_next(&course, pos("m1", "l2", "a2")).unwrap();

        assert_eq!(nav.kind, NavKind::Course);
        assert_eq!(nav.label, "All Done!");
        assert_eq!(nav.href, "/courses/money");
        assert!(nav.target.is_none());
    }

    #[test]
    fn test_next_crosses_module_and_skips_empty_containers() {
        let course = CourseBuilder::new("money")
            .module("m1", 1, |m| m.lesson("l1", 1, &[ActivityKind::Article]).lesson("empty", 2, &[]))
            .module("hollow", 2, |m| m.lesson("nothing", 1, &[]))
            .module("m3", 3, |m| m.lesson("blank", 1, &[]).lesson("l2", 5, &[ActivityKind::Quiz]))
            .build();

        let nav = resolve_next(&course, pos("m1", "l1", "a1")).unwrap();
        assert_eq!(nav.kind, NavKind::Module);
        assert_eq!(nav.label, "Next: Module 3");
        assert_eq!(nav.href, "/courses/money/m3/l2/a1");

        let back = resolve_previous(&course, pos("m3", "l2", "a1")).unwrap().unwrap();
        assert_eq!(back.kind, NavKind::Module);
        assert_eq!(back.label, "Previous: Module 1");
        assert_eq!(back.href, "/courses/money/m1/l1/a1");
    }

    #[test]
    fn test_next_skips_empty_lesson_within_module() {
        let course = CourseBuilder::new("money")
            .module("m1", 1, |m| {
                m.lesson("l1", 1, &[ActivityKind::Article])
                    .lesson("empty", 2, &[])
                    .lesson("l3", 3, &[ActivityKind::Article])
            })
            .build();

        let nav = resolve_next(&course, pos("m1", "l1", "a1")).unwrap();
        assert_eq!(nav.kind, NavKind::Lesson);
        assert_eq!(nav.label, "Next: Lesson 3");
    }

    #[test]
    fn test_previous_at_start_is_none() {
        let course = two_lesson_course();
        assert_eq!(resolve_previous(&course, pos("m1", "l1", "a1")).unwrap(), None);
    }

    #[test]
    fn test_previous_lands_on_last_activity_of_previous_lesson() {
        let course = two_lesson_course();
        let nav = resolve_previous(&course, pos("m1", "l2", "a1")).unwrap().unwrap();

        assert_eq!(nav.kind, NavKind::Lesson);
        assert_eq!(nav.label, "Previous: Lesson 1");
        assert_eq!(nav.href, "/courses/money/m1/l1/a2");
    }

    #[test]
    fn test_unknown_slugs_report_level() {
        let course = two_lesson_course();
        assert_eq!(
            resolve_next(&course, pos("nope", "l1", "a1")).unwrap_err(),
            NotFound::Module("nope".into())
        );
        assert_eq!(
            resolve_next(&course, pos("m1", "nope", "a1")).unwrap_err(),
            NotFound::Lesson("nope".into())
        );
        assert_eq!(
            resolve_previous(&course, pos("m1", "l1", "nope")).unwrap_err(),
            NotFound::Activity("nope".into())
        );
    }

    #[test]
    fn test_walk_visits_every_activity_in_order() {
        let course = CourseBuilder::new("money")
            .module("m2", 2, |m| m.lesson("x", 2, &[ActivityKind::Quiz]).lesson("w", 1, &[ActivityKind::Article, ActivityKind::Quiz]))
            .module("m1", 1, |m| m.lesson("y", 1, &[ActivityKind::Article]).lesson("z", 3, &[]))
            .build();

        let expected: Vec<String> = stops(&course)
            .iter()
            .map(|s| format!("{}/{}/{}", s.module.slug, s.lesson.slug, s.activity.slug))
            .collect();
        assert_eq!(expected, ["m1/y/a1", "m2/w/a1", "m2/w/a2", "m2/x/a1"]);

        let start = first_activity(&course).unwrap();
        let mut target = start.target.clone();
        let mut visited = Vec::new();
        while let Some(t) = target {
            visited.push(format!("{}/{}/{}", t.module_slug, t.lesson_slug, t.activity_slug));

            let here = pos(&t.module_slug, &t.lesson_slug, &t.activity_slug);
            let next = resolve_next(&course, here).unwrap();

            // previous(next(A)) == A for every non-terminal step
            if let Some(n) = &next.target {
                let there = pos(&n.module_slug, &n.lesson_slug, &n.activity_slug);
                let back = resolve_previous(&course, there).unwrap().unwrap();
                assert_eq!(back.target.as_ref(), Some(&t));
            } else {
                assert_eq!(next.label, "All Done!");
            }
            target = next.target;
        }
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_course_without_activities() {
        let course = CourseBuilder::new("money")
            .module("m1", 1, |m| m.lesson("l1", 1, &[]))
            .build();
        assert!(stops(&course).is_empty());
        assert!(first_activity(&course).is_none());
    }
}
