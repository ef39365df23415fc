//! CLI module - Command-line interface for the course service.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `courses` - Catalog operations
//! - `enrollments` - Course rosters

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, MigrateAction};
