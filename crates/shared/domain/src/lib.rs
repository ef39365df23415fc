//! Domain layer - Course catalog entities, projections and rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod constants;
pub mod course;
pub mod error;
pub mod input;
pub mod rules;

pub use constants::*;
pub use course::{
    Course, CourseDetails, CourseSummary, CourseTemplate, Student, StudentEnrollment,
    StudentSummary,
};
pub use error::{DomainError, DomainResult};
pub use input::{ensure_valid, CourseDates, NewCourse, NewEnrollment};
pub use rules::{next_course_id, resolve_semester, single_match};
