//! Validated inputs for catalog and enrollment commands.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::DomainResult;

/// Course creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_new_course_dates"))]
pub struct NewCourse {
    /// Business code of the template to instantiate
    #[validate(length(min = 1, max = 32))]
    pub template_code: String,
    /// Semester code the course is taught in
    #[validate(length(min = 1, max = 10))]
    pub semester: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Course schedule update data transfer object
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[validate(schema(function = "validate_course_dates"))]
pub struct CourseDates {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Enrollment data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEnrollment {
    #[validate(length(min = 1, max = 16))]
    pub ssn: String,
}

/// Validate any input, mapping failures into a domain validation error.
pub fn ensure_valid<T: Validate>(input: &T) -> DomainResult<()> {
    input.validate().map_err(Into::into)
}

fn check_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        let mut err = ValidationError::new("date_order");
        err.message = Some("end date must not be before start date".into());
        return Err(err);
    }
    Ok(())
}

fn validate_new_course_dates(course: &NewCourse) -> Result<(), ValidationError> {
    check_date_order(course.start_date, course.end_date)
}

fn validate_course_dates(dates: &CourseDates) -> Result<(), ValidationError> {
    check_date_order(dates.start_date, dates.end_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_course(code: &str, semester: &str) -> NewCourse {
        NewCourse {
            template_code: code.to_string(),
            semester: semester.to_string(),
            start_date: date(2020, 1, 6),
            end_date: date(2020, 5, 1),
        }
    }

    #[test]
    fn test_valid_new_course() {
        assert!(ensure_valid(&new_course("CS101", "20201")).is_ok());
    }

    #[test]
    fn test_empty_template_code_rejected() {
        let result = ensure_valid(&new_course("", "20201"));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_empty_semester_rejected() {
        assert!(ensure_valid(&new_course("CS101", "")).is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut course = new_course("CS101", "20201");
        course.end_date = date(2019, 12, 31);
        assert!(ensure_valid(&course).is_err());
    }

    #[test]
    fn test_single_day_course_allowed() {
        let dates = CourseDates {
            start_date: date(2020, 3, 2),
            end_date: date(2020, 3, 2),
        };
        assert!(ensure_valid(&dates).is_ok());
    }

    #[test]
    fn test_empty_ssn_rejected() {
        let enrollment = NewEnrollment { ssn: String::new() };
        assert!(ensure_valid(&enrollment).is_err());
    }
}
