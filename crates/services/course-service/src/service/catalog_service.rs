//! Catalog service - Creates, reschedules and removes course instances.
//!
//! Every operation runs in one unit of work. All existence checks happen
//! before the first write, so a failed operation leaves the store untouched.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{ensure_valid, Course, CourseDates, CourseDetails, CourseSummary, NewCourse};

use super::query_service::{course_details, require_course, require_template_of, QueryService};
use super::unit_of_work::finish;
use crate::repository::{Gateway, Isolation, UnitOfWork};

/// Catalog service trait for dependency injection.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// List every course, ordered by id
    async fn list_courses(&self) -> AppResult<Vec<CourseSummary>>;

    /// Get one course with description and enrollment count
    async fn get_course_by_id(&self, id: i32) -> AppResult<CourseDetails>;

    /// Create a course from a template business code
    async fn add_course(&self, input: NewCourse) -> AppResult<CourseDetails>;

    /// Reschedule a course (start and end date only)
    async fn update_course(&self, id: i32, dates: CourseDates) -> AppResult<CourseDetails>;

    /// Delete a course together with its enrollments
    async fn delete_course(&self, id: i32) -> AppResult<()>;

    /// List courses of one semester; blank means the default semester
    async fn get_courses_by_semester(&self, semester: Option<&str>)
        -> AppResult<Vec<CourseSummary>>;
}

/// Concrete implementation of CatalogService.
pub struct CourseCatalog {
    gateway: Arc<dyn Gateway>,
    queries: Arc<dyn QueryService>,
}

impl CourseCatalog {
    /// Create new catalog service instance
    pub fn new(gateway: Arc<dyn Gateway>, queries: Arc<dyn QueryService>) -> Self {
        Self { gateway, queries }
    }

    async fn add_course_in(uow: &mut dyn UnitOfWork, input: NewCourse) -> AppResult<CourseDetails> {
        // Allocation locks the course table, so it must precede every read
        let id = uow.allocate_course_id().await?;

        let template = uow
            .find_template_by_code(&input.template_code)
            .await?
            .ok_or_else(|| AppError::template_not_found(input.template_code.clone()))?;

        let course = uow
            .insert_course(Course {
                id,
                template_id: template.id,
                semester: input.semester,
                start_date: input.start_date,
                end_date: input.end_date,
            })
            .await?;

        Ok(CourseDetails::project(&course, &template, 0))
    }

    async fn update_course_in(
        uow: &mut dyn UnitOfWork,
        id: i32,
        dates: CourseDates,
    ) -> AppResult<CourseDetails> {
        let course = require_course(&*uow, id).await?;
        let template = require_template_of(&*uow, &course).await?;

        let course = uow
            .update_course_dates(id, dates.start_date, dates.end_date)
            .await?;

        course_details(&*uow, &course, &template).await
    }

    async fn delete_course_in(uow: &mut dyn UnitOfWork, id: i32) -> AppResult<u64> {
        require_course(&*uow, id).await?;

        let enrollments = uow.delete_enrollments_for_course(id).await?;
        let deleted = uow.delete_course(id).await?;
        if deleted != 1 {
            return Err(AppError::invariant(format!(
                "deleting course {} removed {} rows",
                id, deleted
            )));
        }

        Ok(enrollments)
    }
}

#[async_trait]
impl CatalogService for CourseCatalog {
    async fn list_courses(&self) -> AppResult<Vec<CourseSummary>> {
        self.queries.list_courses().await
    }

    async fn get_course_by_id(&self, id: i32) -> AppResult<CourseDetails> {
        self.queries.get_course_by_id(id).await
    }

    async fn add_course(&self, input: NewCourse) -> AppResult<CourseDetails> {
        ensure_valid(&input)?;

        // Serializable: the id is derived from the current max
        let mut uow = self.gateway.begin(Isolation::Serializable).await?;
        let result = Self::add_course_in(&mut *uow, input).await;
        let details = finish(uow, result).await?;

        tracing::info!(
            "Course {} created from template {} for semester {}",
            details.id,
            details.template_code,
            details.semester
        );
        Ok(details)
    }

    async fn update_course(&self, id: i32, dates: CourseDates) -> AppResult<CourseDetails> {
        ensure_valid(&dates)?;

        let mut uow = self.gateway.begin(Isolation::ReadCommitted).await?;
        let result = Self::update_course_in(&mut *uow, id, dates).await;
        let details = finish(uow, result).await?;

        tracing::info!(
            "Course {} rescheduled to {} - {}",
            id,
            details.start_date,
            details.end_date
        );
        Ok(details)
    }

    async fn delete_course(&self, id: i32) -> AppResult<()> {
        let mut uow = self.gateway.begin(Isolation::ReadCommitted).await?;
        let result = Self::delete_course_in(&mut *uow, id).await;
        let enrollments = finish(uow, result).await?;

        tracing::info!("Course {} deleted with {} enrollments", id, enrollments);
        Ok(())
    }

    async fn get_courses_by_semester(
        &self,
        semester: Option<&str>,
    ) -> AppResult<Vec<CourseSummary>> {
        self.queries.get_courses_by_semester(semester).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::CourseTemplate;
    use mockall::Sequence;

    use crate::repository::{MockGateway, MockUnitOfWork};
    use crate::service::CourseQueries;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template() -> CourseTemplate {
        CourseTemplate {
            id: 1,
            template_code: "CS101".to_string(),
            name: "Intro".to_string(),
            description: "Basics".to_string(),
        }
    }

    fn new_course(code: &str) -> NewCourse {
        NewCourse {
            template_code: code.to_string(),
            semester: "20201".to_string(),
            start_date: date(2020, 1, 6),
            end_date: date(2020, 5, 1),
        }
    }

    fn catalog_with(uow: MockUnitOfWork) -> CourseCatalog {
        let mut gateway = MockGateway::new();
        gateway
            .expect_begin()
            .times(1)
            .return_once(move |_| Ok(Box::new(uow) as Box<dyn UnitOfWork>));

        let gateway: Arc<dyn Gateway> = Arc::new(gateway);
        let queries = Arc::new(CourseQueries::new(gateway.clone(), "20153"));
        CourseCatalog::new(gateway, queries)
    }

    #[tokio::test]
    async fn test_add_course_commits_on_success() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_template_by_code()
            .times(1)
            .returning(|_| Ok(Some(template())));
        uow.expect_allocate_course_id().returning(|| Ok(1));
        uow.expect_insert_course().returning(|c| Ok(c));
        uow.expect_commit().times(1).returning(|| Ok(()));
        uow.expect_rollback().never();

        let details = catalog_with(uow).add_course(new_course("CS101")).await.unwrap();

        assert_eq!(details.id, 1);
        assert_eq!(details.template_code, "CS101");
        assert_eq!(details.student_count, 0);
    }

    #[tokio::test]
    async fn test_add_course_unknown_template_rolls_back_without_writes() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_allocate_course_id().times(1).returning(|| Ok(1));
        uow.expect_find_template_by_code().returning(|_| Ok(None));
        uow.expect_insert_course().never();
        uow.expect_commit().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let err = catalog_with(uow)
            .add_course(new_course("NOPE"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::TemplateNotFound("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_add_course_allocates_id_before_any_read() {
        let mut seq = Sequence::new();
        let mut uow = MockUnitOfWork::new();
        uow.expect_allocate_course_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(7));
        uow.expect_find_template_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(template())));
        uow.expect_insert_course()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|c| Ok(c));
        uow.expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let details = catalog_with(uow).add_course(new_course("CS101")).await.unwrap();

        assert_eq!(details.id, 7);
    }

    #[tokio::test]
    async fn test_add_course_serialization_conflict_is_not_store_outage() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_allocate_course_id()
            .times(1)
            .returning(|| Err(AppError::invariant("could not serialize access")));
        uow.expect_find_template_by_code().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let err = catalog_with(uow)
            .add_course(new_course("CS101"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_enrollments_before_course() {
        let mut seq = Sequence::new();
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| {
                Ok(Some(Course {
                    id,
                    template_id: 1,
                    semester: "20201".to_string(),
                    start_date: date(2020, 1, 6),
                    end_date: date(2020, 5, 1),
                }))
            });
        uow.expect_delete_enrollments_for_course()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(3));
        uow.expect_delete_course()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(1));
        uow.expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        catalog_with(uow).delete_course(5).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_resolves_template_once() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|id| {
            Ok(Some(Course {
                id,
                template_id: 1,
                semester: "20201".to_string(),
                start_date: date(2020, 1, 6),
                end_date: date(2020, 5, 1),
            }))
        });
        uow.expect_find_template()
            .times(1)
            .returning(|_| Ok(Some(template())));
        uow.expect_update_course_dates()
            .times(1)
            .returning(|id, start_date, end_date| {
                Ok(Course {
                    id,
                    template_id: 1,
                    semester: "20201".to_string(),
                    start_date,
                    end_date,
                })
            });
        uow.expect_count_enrollments().times(1).returning(|_| Ok(3));
        uow.expect_commit().times(1).returning(|| Ok(()));

        let dates = CourseDates {
            start_date: date(2020, 2, 1),
            end_date: date(2020, 6, 1),
        };
        let details = catalog_with(uow).update_course(5, dates).await.unwrap();

        assert_eq!(details.student_count, 3);
        assert_eq!(details.description, "Basics");
        assert_eq!(details.start_date, date(2020, 2, 1));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced_unchanged_and_not_retried() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_template_by_code().returning(|_| Ok(Some(template())));
        uow.expect_allocate_course_id().times(1).returning(|| Ok(1));
        uow.expect_insert_course()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("connection reset")));
        uow.expect_commit().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let err = catalog_with(uow)
            .add_course(new_course("CS101"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::StoreUnavailable("connection reset".to_string()));
    }

    #[tokio::test]
    async fn test_failed_rollback_keeps_original_error() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|_| Ok(None));
        uow.expect_rollback()
            .times(1)
            .returning(|| Err(AppError::store_unavailable("gone")));

        let err = catalog_with(uow).delete_course(12).await.unwrap_err();

        assert_eq!(err, AppError::CourseNotFound(12));
    }

    #[tokio::test]
    async fn test_update_checks_course_before_template() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|_| Ok(None));
        uow.expect_find_template().never();
        uow.expect_update_course_dates().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let dates = CourseDates {
            start_date: date(2020, 2, 1),
            end_date: date(2020, 6, 1),
        };
        let err = catalog_with(uow).update_course(44, dates).await.unwrap_err();

        assert_eq!(err, AppError::CourseNotFound(44));
    }

    #[tokio::test]
    async fn test_update_with_dangling_template_fails_before_write() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_course().returning(|id| {
            Ok(Some(Course {
                id,
                template_id: 9,
                semester: "20201".to_string(),
                start_date: date(2020, 1, 6),
                end_date: date(2020, 5, 1),
            }))
        });
        uow.expect_find_template().returning(|_| Ok(None));
        uow.expect_update_course_dates().never();
        uow.expect_rollback().times(1).returning(|| Ok(()));

        let dates = CourseDates {
            start_date: date(2020, 2, 1),
            end_date: date(2020, 6, 1),
        };
        let err = catalog_with(uow).update_course(3, dates).await.unwrap_err();

        assert!(matches!(err, AppError::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_input_never_opens_unit_of_work() {
        let mut gateway = MockGateway::new();
        gateway.expect_begin().never();
        let gateway: Arc<dyn Gateway> = Arc::new(gateway);
        let catalog = CourseCatalog::new(
            gateway.clone(),
            Arc::new(CourseQueries::new(gateway, "20153")),
        );

        let mut input = new_course("CS101");
        input.end_date = date(2019, 1, 1);
        let err = catalog.add_course(input).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
