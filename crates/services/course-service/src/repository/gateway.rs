//! Data store gateway abstraction.
//!
//! A [`Gateway`] hands out units of work. Every read and write a service
//! operation performs goes through one [`UnitOfWork`], which is either
//! committed as a whole or rolled back as a whole.

use async_trait::async_trait;
use chrono::NaiveDate;

use common::AppResult;
use domain::{Course, CourseTemplate, Student, StudentEnrollment};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Isolation requested for a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Default for reads and single-row writes
    ReadCommitted,
    /// Used when a write depends on an aggregate read (course id allocation)
    Serializable,
}

/// Entry point into the store, shared by all services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Start a unit of work with the requested isolation
    async fn begin(&self, isolation: Isolation) -> AppResult<Box<dyn UnitOfWork>>;
}

/// Transactional access to the four catalog collections.
///
/// Lookups return `Ok(None)` for a missing record; deciding which error that
/// is belongs to the caller. Dropping a unit of work without committing it
/// discards its writes.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    // Templates

    /// Find template by business code
    async fn find_template_by_code(&self, code: &str) -> AppResult<Option<CourseTemplate>>;

    /// Find template by identity
    async fn find_template(&self, id: i32) -> AppResult<Option<CourseTemplate>>;

    // Courses

    /// Find course by id (at most one match)
    async fn find_course(&self, id: i32) -> AppResult<Option<Course>>;

    /// Courses ordered by id, each with its template when it still resolves.
    /// `semester` narrows the result to one semester code.
    async fn list_courses(
        &self,
        semester: Option<String>,
    ) -> AppResult<Vec<(Course, Option<CourseTemplate>)>>;

    /// Reserve the next course id. Must be the first call of a serializable
    /// unit of work; concurrent allocators are blocked until this one finishes.
    async fn allocate_course_id(&mut self) -> AppResult<i32>;

    /// Insert a course with an already allocated id
    async fn insert_course(&mut self, course: Course) -> AppResult<Course>;

    /// Replace the start and end date of a course
    async fn update_course_dates(
        &mut self,
        id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Course>;

    /// Delete a course row, returning the number of rows removed
    async fn delete_course(&mut self, id: i32) -> AppResult<u64>;

    // Students and enrollments

    /// Find student by SSN
    async fn find_student_by_ssn(&self, ssn: &str) -> AppResult<Option<Student>>;

    /// Students enrolled in a course, in enrollment order
    async fn students_in_course(&self, course_id: i32) -> AppResult<Vec<Student>>;

    /// Number of enrollment rows for a course
    async fn count_enrollments(&self, course_id: i32) -> AppResult<u64>;

    /// Insert an enrollment row
    async fn insert_enrollment(
        &mut self,
        student_id: i32,
        course_id: i32,
    ) -> AppResult<StudentEnrollment>;

    /// Delete every enrollment of a course, returning the number removed
    async fn delete_enrollments_for_course(&mut self, course_id: i32) -> AppResult<u64>;

    // Lifecycle

    /// Make all writes of this unit of work visible
    async fn commit(&mut self) -> AppResult<()>;

    /// Discard all writes of this unit of work
    async fn rollback(&mut self) -> AppResult<()>;
}
