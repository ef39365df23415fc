//! Course catalog entities and their projections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reusable definition of a course's subject content.
///
/// `template_code` is the human-assigned business key (e.g. "T-514-VEFT"),
/// `id` the store-assigned identity that courses reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTemplate {
    pub id: i32,
    pub template_code: String,
    pub name: String,
    pub description: String,
}

/// A scheduled instance of a template for one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i32,
    /// Identity of the [`CourseTemplate`] this course teaches
    pub template_id: i32,
    pub semester: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Course {
    /// Replace the schedule of this course
    pub fn reschedule(&mut self, start_date: NaiveDate, end_date: NaiveDate) {
        self.start_date = start_date;
        self.end_date = end_date;
    }
}

/// Student reference data, looked up by SSN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i32,
    pub ssn: String,
    pub name: String,
}

/// One student's participation in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEnrollment {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
}

// =============================================================================
// Projections
// =============================================================================

/// Lightweight course listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: i32,
    /// Business code of the template
    pub template_code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CourseSummary {
    /// Project a course joined with its template
    pub fn project(course: &Course, template: &CourseTemplate) -> Self {
        Self {
            id: course.id,
            template_code: template.template_code.clone(),
            name: template.name.clone(),
            start_date: course.start_date,
            end_date: course.end_date,
        }
    }
}

/// Full course record including the template description and enrollment count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub id: i32,
    pub template_code: String,
    pub name: String,
    pub description: String,
    pub semester: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub student_count: u64,
}

impl CourseDetails {
    /// Project a course joined with its template and enrollment count
    pub fn project(course: &Course, template: &CourseTemplate, student_count: u64) -> Self {
        Self {
            id: course.id,
            template_code: template.template_code.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            semester: course.semester.clone(),
            start_date: course.start_date,
            end_date: course.end_date,
            student_count,
        }
    }
}

/// Student entry in a course roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub ssn: String,
    pub name: String,
}

impl From<Student> for StudentSummary {
    fn from(student: Student) -> Self {
        Self {
            ssn: student.ssn,
            name: student.name,
        }
    }
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            ssn: student.ssn.clone(),
            name: student.name.clone(),
        }
    }
}
