//! Catalog rules that do not depend on a store.

use crate::constants::{DEFAULT_SEMESTER, FIRST_COURSE_ID};
use crate::error::{DomainError, DomainResult};

/// Resolve the semester a filter applies to.
///
/// A missing or blank code falls back to `default`; it never widens the
/// filter to every semester.
pub fn resolve_semester<'a>(requested: Option<&'a str>, default: &'a str) -> &'a str {
    match requested.map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => {
            let fallback = default.trim();
            if fallback.is_empty() {
                DEFAULT_SEMESTER
            } else {
                fallback
            }
        }
    }
}

/// Next course id given the highest id currently stored.
pub fn next_course_id(current_max: Option<i32>) -> DomainResult<i32> {
    match current_max {
        None => Ok(FIRST_COURSE_ID),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("course id space exhausted")),
    }
}

/// Reduce a lookup result to at most one row.
///
/// More than one row for an identity lookup means the store lost a uniqueness
/// guarantee, which is reported as an invariant violation.
pub fn single_match<T>(mut rows: Vec<T>, what: &str) -> DomainResult<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        n => Err(DomainError::invariant(format!(
            "{} matched {} rows, expected at most one",
            what, n
        ))),
    }
}
