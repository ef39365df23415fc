//! SeaORM-backed gateway.
//!
//! Each unit of work is one database transaction. Course id allocation takes
//! a table lock on PostgreSQL so that max(id) + 1 cannot be computed twice.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};

use common::{AppError, AppResult};
use domain::{next_course_id, single_match, Course, CourseTemplate, Student, StudentEnrollment};

use super::entities::{course, course_template, student, student_enrollment};
use super::gateway::{Gateway, Isolation, UnitOfWork};

/// Gateway over a SeaORM connection pool
#[derive(Clone)]
pub struct SeaGateway {
    db: DatabaseConnection,
}

impl SeaGateway {
    /// Create new gateway instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Gateway for SeaGateway {
    async fn begin(&self, isolation: Isolation) -> AppResult<Box<dyn UnitOfWork>> {
        let level = match isolation {
            Isolation::ReadCommitted => IsolationLevel::ReadCommitted,
            Isolation::Serializable => IsolationLevel::Serializable,
        };

        let txn = self
            .db
            .begin_with_config(Some(level), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        Ok(Box::new(SeaUnitOfWork { txn: Some(txn) }))
    }
}

/// Transaction-scoped unit of work.
///
/// The transaction is taken out on commit or rollback; any later call fails
/// with an invariant violation instead of touching a finished transaction.
pub struct SeaUnitOfWork {
    txn: Option<DatabaseTransaction>,
}

impl SeaUnitOfWork {
    fn txn(&self) -> AppResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| AppError::invariant("unit of work already finished"))
    }
}

#[async_trait]
impl UnitOfWork for SeaUnitOfWork {
    async fn find_template_by_code(&self, code: &str) -> AppResult<Option<CourseTemplate>> {
        let rows = course_template::Entity::find()
            .filter(course_template::Column::TemplateCode.eq(code))
            .limit(2)
            .all(self.txn()?)
            .await
            .map_err(AppError::from)?;

        let row = single_match(rows, "course template code")?;
        Ok(row.map(CourseTemplate::from))
    }

    async fn find_template(&self, id: i32) -> AppResult<Option<CourseTemplate>> {
        let result = course_template::Entity::find_by_id(id)
            .one(self.txn()?)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(CourseTemplate::from))
    }

    async fn find_course(&self, id: i32) -> AppResult<Option<Course>> {
        let rows = course::Entity::find()
            .filter(course::Column::Id.eq(id))
            .limit(2)
            .all(self.txn()?)
            .await
            .map_err(AppError::from)?;

        let row = single_match(rows, "course id")?;
        Ok(row.map(Course::from))
    }

    async fn list_courses(
        &self,
        semester: Option<String>,
    ) -> AppResult<Vec<(Course, Option<CourseTemplate>)>> {
        let mut query = course::Entity::find().find_also_related(course_template::Entity);
        if let Some(semester) = semester {
            query = query.filter(course::Column::Semester.eq(semester));
        }

        let rows = query
            .order_by_asc(course::Column::Id)
            .all(self.txn()?)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(c, t)| (Course::from(c), t.map(CourseTemplate::from)))
            .collect())
    }

    async fn allocate_course_id(&mut self) -> AppResult<i32> {
        let txn = self.txn()?;

        // Blocks other allocators (and writers) until this transaction ends.
        // Must be the first statement of the transaction: a serializable
        // snapshot is fixed by the first read, and it has to see every
        // course committed before the lock was granted.
        if txn.get_database_backend() == DbBackend::Postgres {
            txn.execute(Statement::from_string(
                DbBackend::Postgres,
                "LOCK TABLE courses IN SHARE ROW EXCLUSIVE MODE".to_string(),
            ))
            .await
            .map_err(AppError::from)?;
        }

        let current_max: Option<i32> = course::Entity::find()
            .select_only()
            .column_as(course::Column::Id.max(), "max_id")
            .into_tuple::<Option<i32>>()
            .one(txn)
            .await
            .map_err(AppError::from)?
            .flatten();

        Ok(next_course_id(current_max)?)
    }

    async fn insert_course(&mut self, new_course: Course) -> AppResult<Course> {
        let active_model = course::ActiveModel {
            id: Set(new_course.id),
            template_id: Set(new_course.template_id),
            semester: Set(new_course.semester),
            start_date: Set(new_course.start_date),
            end_date: Set(new_course.end_date),
        };

        // A duplicate key here means id allocation was not serialized
        let model = active_model.insert(self.txn()?).await.map_err(AppError::from)?;
        Ok(Course::from(model))
    }

    async fn update_course_dates(
        &mut self,
        id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Course> {
        let txn = self.txn()?;
        let existing = course::Entity::find_by_id(id)
            .one(txn)
            .await?
            .ok_or(AppError::CourseNotFound(id))?;

        let mut active: course::ActiveModel = existing.into();
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);

        let model = active.update(txn).await.map_err(AppError::from)?;
        Ok(Course::from(model))
    }

    async fn delete_course(&mut self, id: i32) -> AppResult<u64> {
        let result = course::Entity::delete_by_id(id)
            .exec(self.txn()?)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn find_student_by_ssn(&self, ssn: &str) -> AppResult<Option<Student>> {
        let rows = student::Entity::find()
            .filter(student::Column::Ssn.eq(ssn))
            .limit(2)
            .all(self.txn()?)
            .await
            .map_err(AppError::from)?;

        let row = single_match(rows, "student ssn")?;
        Ok(row.map(Student::from))
    }

    async fn students_in_course(&self, course_id: i32) -> AppResult<Vec<Student>> {
        let rows = student_enrollment::Entity::find()
            .filter(student_enrollment::Column::CourseId.eq(course_id))
            .find_also_related(student::Entity)
            .order_by_asc(student_enrollment::Column::Id)
            .all(self.txn()?)
            .await
            .map_err(AppError::from)?;

        rows.into_iter()
            .map(|(enrollment, s)| {
                s.map(Student::from).ok_or_else(|| {
                    AppError::invariant(format!(
                        "enrollment {} references missing student {}",
                        enrollment.id, enrollment.student_id
                    ))
                })
            })
            .collect()
    }

    async fn count_enrollments(&self, course_id: i32) -> AppResult<u64> {
        student_enrollment::Entity::find()
            .filter(student_enrollment::Column::CourseId.eq(course_id))
            .count(self.txn()?)
            .await
            .map_err(AppError::from)
    }

    async fn insert_enrollment(
        &mut self,
        student_id: i32,
        course_id: i32,
    ) -> AppResult<StudentEnrollment> {
        let active_model = student_enrollment::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            ..Default::default()
        };

        let model = active_model.insert(self.txn()?).await.map_err(AppError::from)?;
        Ok(StudentEnrollment::from(model))
    }

    async fn delete_enrollments_for_course(&mut self, course_id: i32) -> AppResult<u64> {
        let result = student_enrollment::Entity::delete_many()
            .filter(student_enrollment::Column::CourseId.eq(course_id))
            .exec(self.txn()?)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn commit(&mut self) -> AppResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| AppError::invariant("unit of work already finished"))?;
        txn.commit().await.map_err(AppError::from)
    }

    async fn rollback(&mut self) -> AppResult<()> {
        match self.txn.take() {
            Some(txn) => txn.rollback().await.map_err(AppError::from),
            None => Ok(()),
        }
    }
}
