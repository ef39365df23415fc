//! Service layer - Catalog, enrollment and query use cases.

mod catalog_service;
mod container;
mod enrollment_service;
mod query_service;
mod unit_of_work;

pub use catalog_service::{CatalogService, CourseCatalog};
pub use container::{ServiceContainer, Services};
pub use enrollment_service::{EnrollmentManager, EnrollmentService};
pub use query_service::{CourseQueries, QueryService};
