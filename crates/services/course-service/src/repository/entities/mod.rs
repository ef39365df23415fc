//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod course;
pub mod course_template;
pub mod student;
pub mod student_enrollment;
