//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Semesters
// =============================================================================

/// Semester code used when a caller filters by semester without naming one
pub const DEFAULT_SEMESTER: &str = "20153";

// =============================================================================
// Identifiers
// =============================================================================

/// First course id handed out when the catalog is empty
pub const FIRST_COURSE_ID: i32 = 1;
