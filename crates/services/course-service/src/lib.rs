//! Course Service Library
//!
//! Business rules for course templates, course instances and student
//! enrollments, on top of a transactional data store gateway.
//! It can be driven from the `course-service` binary or embedded.

pub mod cli;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::AppResult;

use crate::cli::MigrateAction;
use crate::config::CourseServiceConfig;
use crate::infra::Database;
use crate::repository::SeaGateway;
use crate::service::Services;

/// Connect to the database (applying pending migrations) and wire the services.
pub async fn connect(config: &CourseServiceConfig) -> AppResult<Services> {
    let db = Database::connect(&config.database).await?;
    db.ping().await?;
    info!("Course service connected to database");

    let gateway = Arc::new(SeaGateway::new(db.get_connection()));
    Ok(Services::from_gateway(gateway, config.default_semester.clone()))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &CourseServiceConfig,
    action: MigrateAction,
) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
