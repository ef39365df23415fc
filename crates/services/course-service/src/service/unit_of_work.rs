//! Unit of work lifecycle shared by all services.

use common::AppResult;

use crate::repository::UnitOfWork;

/// Finish a unit of work according to the outcome of the operation.
///
/// The unit of work is committed on success or rolled back on error. A commit
/// failure replaces the result; a rollback failure is logged and the original
/// error is returned.
pub(crate) async fn finish<T>(mut uow: Box<dyn UnitOfWork>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!("Unit of work rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
