//! Domain layer - Entities, value objects and the traits at their seams

pub mod announcement;
pub mod error;
pub mod experiment;
pub mod store;

pub use error::DomainError;
