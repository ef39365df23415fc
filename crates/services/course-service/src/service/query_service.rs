//! Query service - Read-only course and roster projections.
//!
//! Owns the one definition of how courses are projected (summary vs.
//! detailed). The catalog and enrollment services reuse the helpers below
//! inside their own units of work.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{
    resolve_semester, Course, CourseDetails, CourseSummary, CourseTemplate, StudentSummary,
};

use super::unit_of_work::finish;
use crate::repository::{Gateway, Isolation, UnitOfWork};

/// Query service trait for dependency injection.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// List every course, ordered by id
    async fn list_courses(&self) -> AppResult<Vec<CourseSummary>>;

    /// Get one course with description and enrollment count
    async fn get_course_by_id(&self, id: i32) -> AppResult<CourseDetails>;

    /// List courses of one semester; blank means the default semester
    async fn get_courses_by_semester(&self, semester: Option<&str>)
        -> AppResult<Vec<CourseSummary>>;

    /// List students enrolled in a course
    async fn get_students_in_course(&self, course_id: i32) -> AppResult<Vec<StudentSummary>>;
}

/// Concrete implementation of QueryService over a gateway.
pub struct CourseQueries {
    gateway: Arc<dyn Gateway>,
    default_semester: String,
}

impl CourseQueries {
    /// Create new query service instance
    pub fn new(gateway: Arc<dyn Gateway>, default_semester: impl Into<String>) -> Self {
        Self {
            gateway,
            default_semester: default_semester.into(),
        }
    }

    async fn summaries(&self, semester: Option<String>) -> AppResult<Vec<CourseSummary>> {
        let uow = self.gateway.begin(Isolation::ReadCommitted).await?;
        let result = uow.list_courses(semester).await.map(project_summaries);
        finish(uow, result).await
    }
}

#[async_trait]
impl QueryService for CourseQueries {
    async fn list_courses(&self) -> AppResult<Vec<CourseSummary>> {
        tracing::debug!("Listing all courses");
        self.summaries(None).await
    }

    async fn get_course_by_id(&self, id: i32) -> AppResult<CourseDetails> {
        let uow = self.gateway.begin(Isolation::ReadCommitted).await?;
        let result: AppResult<CourseDetails> = async {
            let course = require_course(&*uow, id).await?;
            let template = require_template_of(&*uow, &course).await?;
            course_details(&*uow, &course, &template).await
        }
        .await;
        finish(uow, result).await
    }

    async fn get_courses_by_semester(
        &self,
        semester: Option<&str>,
    ) -> AppResult<Vec<CourseSummary>> {
        let semester = resolve_semester(semester, &self.default_semester).to_string();
        tracing::debug!("Listing courses for semester {}", semester);
        self.summaries(Some(semester)).await
    }

    async fn get_students_in_course(&self, course_id: i32) -> AppResult<Vec<StudentSummary>> {
        let uow = self.gateway.begin(Isolation::ReadCommitted).await?;
        let result: AppResult<Vec<StudentSummary>> = async {
            require_course(&*uow, course_id).await?;
            let students = uow.students_in_course(course_id).await?;
            Ok(students.into_iter().map(StudentSummary::from).collect())
        }
        .await;
        finish(uow, result).await
    }
}

// =============================================================================
// Projection helpers (shared with the catalog and enrollment services)
// =============================================================================

/// Load a course or fail with `CourseNotFound`.
pub(crate) async fn require_course(uow: &dyn UnitOfWork, id: i32) -> AppResult<Course> {
    uow.find_course(id).await?.ok_or(AppError::CourseNotFound(id))
}

/// Resolve the template a course points at or fail with `TemplateNotFound`.
pub(crate) async fn require_template_of(
    uow: &dyn UnitOfWork,
    course: &Course,
) -> AppResult<CourseTemplate> {
    uow.find_template(course.template_id)
        .await?
        .ok_or_else(|| AppError::template_not_found(format!("#{}", course.template_id)))
}

/// Detailed projection of a course with its resolved template, counting its enrollments.
pub(crate) async fn course_details(
    uow: &dyn UnitOfWork,
    course: &Course,
    template: &CourseTemplate,
) -> AppResult<CourseDetails> {
    let student_count = uow.count_enrollments(course.id).await?;
    Ok(CourseDetails::project(course, template, student_count))
}

/// Summary projection; courses whose template no longer resolves are skipped.
pub(crate) fn project_summaries(rows: Vec<(Course, Option<CourseTemplate>)>) -> Vec<CourseSummary> {
    rows.into_iter()
        .filter_map(|(course, template)| match template {
            Some(template) => Some(CourseSummary::project(&course, &template)),
            None => {
                tracing::warn!(
                    "Course {} references missing template {}, skipped",
                    course.id,
                    course.template_id
                );
                None
            }
        })
        .collect()
}
