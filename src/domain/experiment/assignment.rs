//! Persisted variation assignments

use serde::{Deserialize, Serialize};

use super::Variation;

/// Store key prefix shared by every assignment record
pub const ASSIGNMENT_KEY_PREFIX: &str = "ab-test-variation:";

/// Store key of the assignment for an experiment
pub fn assignment_key(experiment_key: &str) -> String {
    format!("{}{}", ASSIGNMENT_KEY_PREFIX, experiment_key)
}

/// Variation pinned for an experiment in the current identity scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub experiment_key: String,
    pub variation: Variation,
}

impl AssignmentRecord {
    pub fn new(experiment_key: impl Into<String>, variation: Variation) -> Self {
        Self {
            experiment_key: experiment_key.into(),
            variation,
        }
    }

    pub fn store_key(&self) -> String {
        assignment_key(&self.experiment_key)
    }
}
