//! Infrastructure layer - External service implementations

pub mod announcement;
pub mod experiment;
pub mod logging;
pub mod services;
pub mod store;
