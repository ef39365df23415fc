//! Repository layer - Data store gateway and its implementations.

pub mod entities;
mod gateway;
mod memory_store;
mod sea_store;

pub use gateway::{Gateway, Isolation, UnitOfWork};
pub use memory_store::{MemoryGateway, MemoryUnitOfWork, Tables};
pub use sea_store::{SeaGateway, SeaUnitOfWork};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use gateway::{MockGateway, MockUnitOfWork};
