//! In-process gateway.
//!
//! All tables live behind one async mutex. A unit of work holds the mutex for
//! its whole lifetime and mutates a working copy, which replaces the shared
//! tables only on commit. Units of work are therefore fully serialized.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use common::{AppError, AppResult};
use domain::{next_course_id, single_match, Course, CourseTemplate, Student, StudentEnrollment};

use super::gateway::{Gateway, Isolation, UnitOfWork};

/// The four catalog collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub templates: Vec<CourseTemplate>,
    pub courses: Vec<Course>,
    pub students: Vec<Student>,
    pub enrollments: Vec<StudentEnrollment>,
}

impl Tables {
    fn next_enrollment_id(&self) -> i32 {
        self.enrollments.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }
}

/// Gateway over in-memory tables
#[derive(Clone, Default)]
pub struct MemoryGateway {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryGateway {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given tables
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    /// Copy of the committed tables
    pub async fn snapshot(&self) -> Tables {
        self.tables.lock().await.clone()
    }

    /// Add a template, assigning its id. Templates are reference data.
    pub async fn seed_template(
        &self,
        template_code: &str,
        name: &str,
        description: &str,
    ) -> CourseTemplate {
        let mut tables = self.tables.lock().await;
        let template = CourseTemplate {
            id: tables.templates.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            template_code: template_code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        };
        tables.templates.push(template.clone());
        template
    }

    /// Add a student, assigning its id. Students are reference data.
    pub async fn seed_student(&self, ssn: &str, name: &str) -> Student {
        let mut tables = self.tables.lock().await;
        let student = Student {
            id: tables.students.iter().map(|s| s.id).max().unwrap_or(0) + 1,
            ssn: ssn.to_string(),
            name: name.to_string(),
        };
        tables.students.push(student.clone());
        student
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn begin(&self, _isolation: Isolation) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(MemoryUnitOfWork {
            guard: Some(guard),
            working,
        }))
    }
}

/// Unit of work holding the store lock
pub struct MemoryUnitOfWork {
    guard: Option<OwnedMutexGuard<Tables>>,
    working: Tables,
}

impl MemoryUnitOfWork {
    fn ensure_open(&self) -> AppResult<()> {
        if self.guard.is_none() {
            return Err(AppError::invariant("unit of work already finished"));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_template_by_code(&self, code: &str) -> AppResult<Option<CourseTemplate>> {
        self.ensure_open()?;
        let rows: Vec<CourseTemplate> = self
            .working
            .templates
            .iter()
            .filter(|t| t.template_code == code)
            .cloned()
            .collect();
        Ok(single_match(rows, "course template code")?)
    }

    async fn find_template(&self, id: i32) -> AppResult<Option<CourseTemplate>> {
        self.ensure_open()?;
        let rows: Vec<CourseTemplate> = self
            .working
            .templates
            .iter()
            .filter(|t| t.id == id)
            .cloned()
            .collect();
        Ok(single_match(rows, "course template id")?)
    }

    async fn find_course(&self, id: i32) -> AppResult<Option<Course>> {
        self.ensure_open()?;
        let rows: Vec<Course> = self
            .working
            .courses
            .iter()
            .filter(|c| c.id == id)
            .cloned()
            .collect();
        Ok(single_match(rows, "course id")?)
    }

    async fn list_courses(
        &self,
        semester: Option<String>,
    ) -> AppResult<Vec<(Course, Option<CourseTemplate>)>> {
        self.ensure_open()?;
        let mut courses: Vec<Course> = self
            .working
            .courses
            .iter()
            .filter(|c| semester.as_deref().map_or(true, |s| c.semester == s))
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.id);

        Ok(courses
            .into_iter()
            .map(|c| {
                let template = self
                    .working
                    .templates
                    .iter()
                    .find(|t| t.id == c.template_id)
                    .cloned();
                (c, template)
            })
            .collect())
    }

    async fn allocate_course_id(&mut self) -> AppResult<i32> {
        self.ensure_open()?;
        let current_max = self.working.courses.iter().map(|c| c.id).max();
        Ok(next_course_id(current_max)?)
    }

    async fn insert_course(&mut self, course: Course) -> AppResult<Course> {
        self.ensure_open()?;
        if self.working.courses.iter().any(|c| c.id == course.id) {
            return Err(AppError::invariant(format!(
                "course id {} already taken",
                course.id
            )));
        }
        if !self.working.templates.iter().any(|t| t.id == course.template_id) {
            return Err(AppError::invariant(format!(
                "course references missing template {}",
                course.template_id
            )));
        }

        self.working.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course_dates(
        &mut self,
        id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Course> {
        self.ensure_open()?;
        let course = self
            .working
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::CourseNotFound(id))?;

        course.reschedule(start_date, end_date);
        Ok(course.clone())
    }

    async fn delete_course(&mut self, id: i32) -> AppResult<u64> {
        self.ensure_open()?;
        let before = self.working.courses.len();
        self.working.courses.retain(|c| c.id != id);

        // Mirrors ON DELETE CASCADE on the enrollment foreign key
        self.working.enrollments.retain(|e| e.course_id != id);

        Ok((before - self.working.courses.len()) as u64)
    }

    async fn find_student_by_ssn(&self, ssn: &str) -> AppResult<Option<Student>> {
        self.ensure_open()?;
        let rows: Vec<Student> = self
            .working
            .students
            .iter()
            .filter(|s| s.ssn == ssn)
            .cloned()
            .collect();
        Ok(single_match(rows, "student ssn")?)
    }

    async fn students_in_course(&self, course_id: i32) -> AppResult<Vec<Student>> {
        self.ensure_open()?;
        let mut enrollments: Vec<&StudentEnrollment> = self
            .working
            .enrollments
            .iter()
            .filter(|e| e.course_id == course_id)
            .collect();
        enrollments.sort_by_key(|e| e.id);

        enrollments
            .into_iter()
            .map(|e| {
                self.working
                    .students
                    .iter()
                    .find(|s| s.id == e.student_id)
                    .cloned()
                    .ok_or_else(|| {
                        AppError::invariant(format!(
                            "enrollment {} references missing student {}",
                            e.id, e.student_id
                        ))
                    })
            })
            .collect()
    }

    async fn count_enrollments(&self, course_id: i32) -> AppResult<u64> {
        self.ensure_open()?;
        Ok(self
            .working
            .enrollments
            .iter()
            .filter(|e| e.course_id == course_id)
            .count() as u64)
    }

    async fn insert_enrollment(
        &mut self,
        student_id: i32,
        course_id: i32,
    ) -> AppResult<StudentEnrollment> {
        self.ensure_open()?;
        let student_exists = self.working.students.iter().any(|s| s.id == student_id);
        let course_exists = self.working.courses.iter().any(|c| c.id == course_id);
        if !student_exists || !course_exists {
            return Err(AppError::invariant(format!(
                "enrollment references missing student {} or course {}",
                student_id, course_id
            )));
        }

        let enrollment = StudentEnrollment {
            id: self.working.next_enrollment_id(),
            student_id,
            course_id,
        };
        self.working.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn delete_enrollments_for_course(&mut self, course_id: i32) -> AppResult<u64> {
        self.ensure_open()?;
        let before = self.working.enrollments.len();
        self.working.enrollments.retain(|e| e.course_id != course_id);
        Ok((before - self.working.enrollments.len()) as u64)
    }

    async fn commit(&mut self) -> AppResult<()> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| AppError::invariant("unit of work already finished"))?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.guard.take();
        self.working = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn course(id: i32, template_id: i32) -> Course {
        Course {
            id,
            template_id,
            semester: "20153".to_string(),
            start_date: date(2015, 8, 17),
            end_date: date(2015, 11, 8),
        }
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let gateway = MemoryGateway::new();
        let template = gateway.seed_template("CS101", "Intro", "Basics").await;

        let mut uow = gateway.begin(Isolation::Serializable).await.unwrap();
        uow.insert_course(course(1, template.id)).await.unwrap();
        assert_eq!(uow.find_course(1).await.unwrap().map(|c| c.id), Some(1));
        uow.rollback().await.unwrap();

        assert!(gateway.snapshot().await.courses.is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let gateway = MemoryGateway::new();
        let template = gateway.seed_template("CS101", "Intro", "Basics").await;

        let mut uow = gateway.begin(Isolation::Serializable).await.unwrap();
        uow.insert_course(course(1, template.id)).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(gateway.snapshot().await.courses, vec![course(1, template.id)]);
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_writes() {
        let gateway = MemoryGateway::new();
        let template = gateway.seed_template("CS101", "Intro", "Basics").await;

        {
            let mut uow = gateway.begin(Isolation::ReadCommitted).await.unwrap();
            uow.insert_course(course(1, template.id)).await.unwrap();
        }

        assert!(gateway.snapshot().await.courses.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_course_id_is_invariant_violation() {
        let gateway = MemoryGateway::new();
        let template = gateway.seed_template("CS101", "Intro", "Basics").await;

        let mut uow = gateway.begin(Isolation::Serializable).await.unwrap();
        uow.insert_course(course(1, template.id)).await.unwrap();
        let err = uow.insert_course(course(1, template.id)).await.unwrap_err();

        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_rows_fail_single_match() {
        let template = CourseTemplate {
            id: 1,
            template_code: "CS101".to_string(),
            name: "Intro".to_string(),
            description: String::new(),
        };
        let gateway = MemoryGateway::with_tables(Tables {
            templates: vec![template],
            courses: vec![course(4, 1), course(4, 1)],
            ..Tables::default()
        });

        let uow = gateway.begin(Isolation::ReadCommitted).await.unwrap();
        let err = uow.find_course(4).await.unwrap_err();

        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_finished_unit_of_work_rejects_calls() {
        let gateway = MemoryGateway::new();
        let mut uow = gateway.begin(Isolation::ReadCommitted).await.unwrap();
        uow.commit().await.unwrap();

        assert!(uow.find_course(1).await.is_err());
        assert!(uow.commit().await.is_err());
    }
}
