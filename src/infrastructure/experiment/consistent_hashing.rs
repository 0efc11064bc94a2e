//! Consistent hashing for local variation computation
//!
//! The same anonymous identity always lands in the same bucket for a given
//! experiment, so a freshly computed variation is reproducible even before
//! it is pinned in the assignment store.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::experiment::Variation;
use crate::domain::DomainError;

/// Consistent hasher for experiment buckets
#[derive(Debug, Clone, Copy)]
pub struct ConsistentHasher;

impl ConsistentHasher {
    /// Deterministic bucket (0-99) for an identity and experiment
    pub fn hash_assignment(identity: &str, experiment_key: &str) -> u8 {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        experiment_key.hash(&mut hasher);
        (hasher.finish() % 100) as u8
    }

    /// Whether `hash` falls in `[start_percent, end_percent)`
    pub fn in_range(hash: u8, start_percent: u8, end_percent: u8) -> bool {
        hash >= start_percent && hash < end_percent
    }
}

/// Splits identities between control and treatment by percentage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedVariationSource {
    treatment_percent: u8,
    treatment_name: Option<String>,
}

impl HashedVariationSource {
    pub fn new(treatment_percent: u8) -> Result<Self, DomainError> {
        if treatment_percent > 100 {
            return Err(DomainError::validation(format!(
                "Treatment percentage must be between 0 and 100, got {}",
                treatment_percent
            )));
        }

        Ok(Self {
            treatment_percent,
            treatment_name: None,
        })
    }

    pub fn with_treatment_name(mut self, name: impl Into<String>) -> Self {
        self.treatment_name = Some(name.into());
        self
    }

    /// Variation for `identity`; buckets below the treatment share get treatment
    pub fn variation_for(&self, identity: &str, experiment_key: &str) -> Variation {
        let bucket = ConsistentHasher::hash_assignment(identity, experiment_key);

        if ConsistentHasher::in_range(bucket, 0, self.treatment_percent) {
            Variation::Treatment(self.treatment_name.clone())
        } else {
            Variation::Control
        }
    }
}

impl Default for HashedVariationSource {
    fn default() -> Self {
        Self {
            treatment_percent: 50,
            treatment_name: None,
        }
    }
}
