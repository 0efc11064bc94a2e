//! Experiment domain module for sticky A/B test variations

mod assignment;
mod variation;

pub use ab_test::{AbTest, ExperimentContext};
pub use assignment::{assignment_key, AssignmentRecord, ASSIGNMENT_KEY_PREFIX};
pub use variation::Variation;
