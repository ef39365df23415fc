//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Course catalog service
#[derive(Parser, Debug)]
#[command(name = "course-service")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },

    /// Course catalog operations
    Courses {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Enrollment operations
    Enrollments {
        #[command(subcommand)]
        action: EnrollmentAction,
    },
}

/// Migration actions
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

/// Course catalog actions
#[derive(Subcommand, Debug)]
pub enum CourseAction {
    /// List all courses
    List,
    /// Show one course
    Get {
        /// Course id
        id: i32,
    },
    /// Create a course from a template
    Add {
        /// Template business code (e.g. "T-514-VEFT")
        #[arg(long)]
        template: String,
        /// Semester code (e.g. "20153")
        #[arg(long)]
        semester: String,
        /// First day of teaching (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of teaching (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
    /// Change the start and end date of a course
    Update {
        /// Course id
        id: i32,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Delete a course and its enrollments
    Delete {
        /// Course id
        id: i32,
    },
    /// List courses of a semester (default semester when omitted)
    Semester {
        /// Semester code
        code: Option<String>,
    },
}

/// Enrollment actions
#[derive(Subcommand, Debug)]
pub enum EnrollmentAction {
    /// List students enrolled in a course
    List {
        /// Course id
        course_id: i32,
    },
    /// Enroll a student in a course
    Add {
        /// Course id
        course_id: i32,
        /// Student SSN
        ssn: String,
    },
}
