//! Command implementations.
//!
//! Each command runs one service operation and prints its result as JSON.

use serde::Serialize;

use common::{AppError, AppResult};
use domain::{CourseDates, NewCourse, NewEnrollment};

use super::args::{Commands, CourseAction, EnrollmentAction};
use crate::config::CourseServiceConfig;
use crate::service::{ServiceContainer, Services};

/// Execute a parsed command
pub async fn execute(command: Commands, config: CourseServiceConfig) -> AppResult<()> {
    match command {
        Commands::Migrate { action } => crate::run_migrations(&config, action).await,
        Commands::Courses { action } => {
            let services = crate::connect(&config).await?;
            courses(&services, action).await
        }
        Commands::Enrollments { action } => {
            let services = crate::connect(&config).await?;
            enrollments(&services, action).await
        }
    }
}

/// Run a catalog action
pub async fn courses(services: &Services, action: CourseAction) -> AppResult<()> {
    let catalog = services.catalog();

    match action {
        CourseAction::List => print_json(&catalog.list_courses().await?),
        CourseAction::Get { id } => print_json(&catalog.get_course_by_id(id).await?),
        CourseAction::Add {
            template,
            semester,
            start,
            end,
        } => {
            let input = NewCourse {
                template_code: template,
                semester,
                start_date: start,
                end_date: end,
            };
            print_json(&catalog.add_course(input).await?)
        }
        CourseAction::Update { id, start, end } => {
            let dates = CourseDates {
                start_date: start,
                end_date: end,
            };
            print_json(&catalog.update_course(id, dates).await?)
        }
        CourseAction::Delete { id } => {
            catalog.delete_course(id).await?;
            println!("Course {} deleted", id);
            Ok(())
        }
        CourseAction::Semester { code } => {
            print_json(&catalog.get_courses_by_semester(code.as_deref()).await?)
        }
    }
}

/// Run an enrollment action
pub async fn enrollments(services: &Services, action: EnrollmentAction) -> AppResult<()> {
    let enrollment_service = services.enrollments();

    match action {
        EnrollmentAction::List { course_id } => {
            print_json(&enrollment_service.get_students_in_course(course_id).await?)
        }
        EnrollmentAction::Add { course_id, ssn } => {
            let details = enrollment_service
                .add_student_to_course(course_id, NewEnrollment { ssn })
                .await?;
            print_json(&details)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::invariant(format!("result not serializable: {}", e)))?;
    println!("{}", json);
    Ok(())
}
