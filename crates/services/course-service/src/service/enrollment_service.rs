//! Enrollment service - Links students to course instances.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{ensure_valid, CourseDetails, NewEnrollment, StudentSummary};

use super::query_service::{course_details, require_course, require_template_of, QueryService};
use super::unit_of_work::finish;
use crate::repository::{Gateway, Isolation, UnitOfWork};

/// Enrollment service trait for dependency injection.
#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// List students enrolled in a course
    async fn get_students_in_course(&self, course_id: i32) -> AppResult<Vec<StudentSummary>>;

    /// Enroll the student with the given SSN in a course.
    ///
    /// Enrolling the same student twice creates a second record.
    async fn add_student_to_course(
        &self,
        course_id: i32,
        input: NewEnrollment,
    ) -> AppResult<CourseDetails>;
}

/// Concrete implementation of EnrollmentService.
pub struct EnrollmentManager {
    gateway: Arc<dyn Gateway>,
    queries: Arc<dyn QueryService>,
}

impl EnrollmentManager {
    /// Create new enrollment service instance
    pub fn new(gateway: Arc<dyn Gateway>, queries: Arc<dyn QueryService>) -> Self {
        Self { gateway, queries }
    }

    async fn enroll_in(
        uow: &mut dyn UnitOfWork,
        course_id: i32,
        ssn: &str,
    ) -> AppResult<CourseDetails> {
        // Both sides must exist before anything is written
        let course = require_course(&*uow, course_id).await?;
        let student = uow
            .find_student_by_ssn(ssn)
            .await?
            .ok_or_else(|| AppError::student_not_found(ssn))?;
        let template = require_template_of(&*uow, &course).await?;

        let enrollment = uow.insert_enrollment(student.id, course.id).await?;
        tracing::debug!(
            "Enrollment {} links student {} to course {}",
            enrollment.id,
            student.id,
            course.id
        );

        course_details(&*uow, &course, &template).await
    }
}

#[async_trait]
impl EnrollmentService for EnrollmentManager {
    async fn get_students_in_course(&self, course_id: i32) -> AppResult<Vec<StudentSummary>> {
        self.queries.get_students_in_course(course_id).await
    }

    async fn add_student_to_course(
        &self,
        course_id: i32,
        input: NewEnrollment,
    ) -> AppResult<CourseDetails> {
        ensure_valid(&input)?;

        let mut uow = self.gateway.begin(Isolation::ReadCommitted).await?;
        let result = Self::enroll_in(&mut *uow, course_id, &input.ssn).await;
        let details = finish(uow, result).await?;

        tracing::info!("Student {} enrolled in course {}", input.ssn, course_id);
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{Course, Student};

    use crate::repository::{MockGateway, MockUnitOfWork};
    use crate::service::CourseQueries;

    fn manager_with(uow: MockUnitOfWork) -> EnrollmentManager {
        let mut gateway = MockGateway::new();
        gateway
            .expect_begin()
            .times(1)
            .return_once(move |_| Ok(Box::new(uow) as Box<dyn UnitOfWork>));

        let gateway: Arc<dyn Gateway> = Arc::new(gateway);
        let queries = Arc::new(CourseQueries::new(gateway.clone(), "20153"));
        EnrollmentManager::new(gateway, queries)
    }

    fn course(id: i32) -> Course {
        Course {
            id,
            template_id: 1,
            semester: "20153".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 8, 17).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2015, 11, 8).unwrap(),
        }
    }

    fn enrollment(ssn: &str) -> NewEnrollment {
        NewEnrollment {
            ssn: ssn.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_course_reported_before_student_lookup() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|_| Ok(None));
        uow.expect_find_student_by_ssn().never();
        uow.expect_insert_enrollment().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let err = manager_with(uow)
            .add_student_to_course(999, enrollment("1234567890"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::CourseNotFound(999));
    }

    #[tokio::test]
    async fn test_missing_student_creates_no_enrollment() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|id| Ok(Some(course(id))));
        uow.expect_find_student_by_ssn().returning(|_| Ok(None));
        uow.expect_insert_enrollment().never();
        uow.expect_commit().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let err = manager_with(uow)
            .add_student_to_course(5, enrollment("0000000000"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::StudentNotFound("0000000000".to_string()));
    }

    #[tokio::test]
    async fn test_enrollment_insert_failure_rolls_back() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|id| Ok(Some(course(id))));
        uow.expect_find_student_by_ssn().returning(|ssn| {
            Ok(Some(Student {
                id: 3,
                ssn: ssn.to_string(),
                name: "Jón".to_string(),
            }))
        });
        uow.expect_find_template().returning(|id| {
            Ok(Some(domain::CourseTemplate {
                id,
                template_code: "CS101".to_string(),
                name: "Intro".to_string(),
                description: String::new(),
            }))
        });
        uow.expect_insert_enrollment()
            .times(1)
            .returning(|_, _| Err(AppError::store_unavailable("timeout")));
        uow.expect_commit().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let err = manager_with(uow)
            .add_student_to_course(5, enrollment("1234567890"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::StoreUnavailable("timeout".to_string()));
    }
}
