//! Unified error handling for catalog operations.
//!
//! Every operation of the course services fails with one of these kinds.
//! Not-found conditions are always raised before anything is dereferenced,
//! and store failures are surfaced unchanged (no internal retry).

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Resource errors
    #[error("Course {0} not found")]
    CourseNotFound(i32),

    #[error("Course template {0} not found")]
    TemplateNotFound(String),

    #[error("Student with SSN {0} not found")]
    StudentNotFound(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    // Data layer
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AppError {
    /// Get error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::CourseNotFound(_) => "COURSE_NOT_FOUND",
            AppError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            AppError::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Whether this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::CourseNotFound(_)
                | AppError::TemplateNotFound(_)
                | AppError::StudentNotFound(_)
        )
    }

    /// Get user-facing message (hides store internals)
    pub fn user_message(&self) -> String {
        match self {
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                "The data store is unavailable".to_string()
            }
            AppError::InvariantViolation(msg) => {
                tracing::error!("Invariant violation: {}", msg);
                "An internal consistency error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::InvariantViolation(msg) => AppError::InvariantViolation(msg),
        }
    }
}

// =============================================================================
// Database Error Conversion (SeaORM)
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        use sea_orm::SqlErr;

        if sqlstate(&err).is_some_and(|code| is_concurrency_conflict(&code)) {
            return AppError::InvariantViolation(err.to_string());
        }

        match err.sql_err() {
            // Constraint violations mean a write raced past our checks
            Some(SqlErr::UniqueConstraintViolation(msg)) => AppError::InvariantViolation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::InvariantViolation(msg),
            _ => AppError::StoreUnavailable(err.to_string()),
        }
    }
}

/// SQLSTATE reported by the database driver, if any.
#[cfg(feature = "database")]
fn sqlstate(err: &sea_orm::DbErr) -> Option<String> {
    use sea_orm::{DbErr, RuntimeErr};

    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// Serialization failure (40001) or deadlock (40P01): a concurrency-control
/// conflict between transactions, not an unreachable store.
#[cfg(feature = "database")]
fn is_concurrency_conflict(sqlstate: &str) -> bool {
    matches!(sqlstate, "40001" | "40P01")
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn template_not_found(key: impl Into<String>) -> Self {
        AppError::TemplateNotFound(key.into())
    }

    pub fn student_not_found(ssn: impl Into<String>) -> Self {
        AppError::StudentNotFound(ssn.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        AppError::InvariantViolation(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        AppError::StoreUnavailable(msg.into())
    }
}
