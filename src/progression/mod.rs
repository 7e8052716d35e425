// src/progression/mod.rs

//! Course progression: where a learner goes next and what they have finished.
//!
//! Everything here is synchronous and free of I/O. Callers fetch a
//! [`Course`](crate::models::course::Course) tree and the user's completion
//! records, then derive navigation links and completion state from that
//! snapshot.

pub mod completion;
pub mod links;
pub mod resolver;

pub use completion::{CourseProgress, compute_completion, index_records};
pub use links::{NavKind, Navigation};
pub use resolver::{NotFound, Position, first_activity, resolve_next, resolve_previous};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::models::{
        completion::CompletionRecord,
        course::{Activity, ActivityKind, Course, Lesson, Module},
    };

    /// Builds course trees with generated ids. Activities are named
    /// `a1`, `a2`, ... inside each lesson.
    pub struct CourseBuilder {
        course: Course,
        next_id: i64,
    }

    pub struct ModuleBuilder<'b> {
        module: Module,
        next_id: &'b mut i64,
    }

    impl CourseBuilder {
        pub fn new(slug: &str) -> Self {
            CourseBuilder {
                course: Course {
                    id: 1,
                    slug: slug.to_string(),
                    title: slug.to_uppercase(),
                    description: None,
                    modules: Vec::new(),
                },
                next_id: 100,
            }
        }

        pub fn module(
            mut self,
            slug: &str,
            order: i64,
            f: impl FnOnce(ModuleBuilder<'_>) -> ModuleBuilder<'_>,
        ) -> Self {
            self.next_id += 1;
            let module = Module {
                id: self.next_id,
                slug: slug.to_string(),
                title: format!("Module {}", slug),
                order,
                lessons: Vec::new(),
            };
            let built = f(ModuleBuilder {
                module,
                next_id: &mut self.next_id,
            })
            .module;
            self.course.modules.push(built);
            self
        }

        pub fn build(mut self) -> Course {
            self.course.normalize();
            self.course
        }
    }

    impl<'b> ModuleBuilder<'b> {
        pub fn lesson(mut self, slug: &str, order: i64, kinds: &[ActivityKind]) -> Self {
            *self.next_id += 1;
            let lesson_id = *self.next_id;
            let activities = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| {
                    *self.next_id += 1;
                    Activity {
                        id: *self.next_id,
                        slug: format!("a{}", i + 1),
                        title: format!("{} {}", kind, i + 1),
                        kind: *kind,
                        order: i as i64 + 1,
                        body: None,
                    }
                })
                .collect();
            self.module.lessons.push(Lesson {
                id: lesson_id,
                slug: slug.to_string(),
                title: format!("Lesson {}", slug),
                order,
                activities,
            });
            self
        }
    }

    /// One module, two lessons, each holding an article then a quiz.
    pub fn two_lesson_course() -> Course {
        CourseBuilder::new("money")
            .module("m1", 1, |m| {
                m.lesson("l1", 1, &[ActivityKind::Article, ActivityKind::Quiz])
                    .lesson("l2", 2, &[ActivityKind::Article, ActivityKind::Quiz])
            })
            .build()
    }

    pub fn record(activity_id: i64) -> CompletionRecord {
        CompletionRecord {
            user_id: 1,
            activity_id,
            completed_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            correct_answers: None,
            total_questions: None,
        }
    }

    pub fn scored(activity_id: i64, correct: i64, total: i64) -> CompletionRecord {
        CompletionRecord {
            correct_answers: Some(correct),
            total_questions: Some(total),
            ..record(activity_id)
        }
    }
}
