//! Service Container - Centralized service access.
//!
//! All services share one gateway handle; nothing else is shared between
//! calls.

use std::sync::Arc;

use super::{
    CatalogService, CourseCatalog, CourseQueries, EnrollmentManager, EnrollmentService,
    QueryService,
};
use crate::repository::Gateway;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get course catalog service
    fn catalog(&self) -> Arc<dyn CatalogService>;

    /// Get enrollment service
    fn enrollments(&self) -> Arc<dyn EnrollmentService>;

    /// Get read-only query service
    fn queries(&self) -> Arc<dyn QueryService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    catalog_service: Arc<dyn CatalogService>,
    enrollment_service: Arc<dyn EnrollmentService>,
    query_service: Arc<dyn QueryService>,
}

impl Services {
    /// Wire every service onto one gateway
    pub fn from_gateway(gateway: Arc<dyn Gateway>, default_semester: impl Into<String>) -> Self {
        let query_service: Arc<dyn QueryService> =
            Arc::new(CourseQueries::new(gateway.clone(), default_semester));
        let catalog_service = Arc::new(CourseCatalog::new(gateway.clone(), query_service.clone()));
        let enrollment_service = Arc::new(EnrollmentManager::new(gateway, query_service.clone()));

        Self {
            catalog_service,
            enrollment_service,
            query_service,
        }
    }
}

impl ServiceContainer for Services {
    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentService> {
        self.enrollment_service.clone()
    }

    fn queries(&self) -> Arc<dyn QueryService> {
        self.query_service.clone()
    }
}
