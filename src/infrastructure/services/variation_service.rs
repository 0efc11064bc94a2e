//! Sticky A/B test variation service

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::domain::experiment::{
    assignment_key, AbTest, AssignmentRecord, Variation, ASSIGNMENT_KEY_PREFIX,
};
use crate::domain::store::{KeyValueStore, KeyValueStoreExt};
use crate::domain::DomainError;

/// Resolves experiment variations, pinning logged-out assignments
///
/// The first variation observed for a logged-out experiment is persisted
/// and returned for every later call until [`Self::reset`], whatever
/// variation the caller supplies afterwards.
#[derive(Debug, Clone)]
pub struct CachedVariationProvider {
    store: Arc<dyn KeyValueStore>,
}

impl CachedVariationProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn variation(&self, ab_test: &AbTest) -> Variation {
        if !ab_test.is_sticky() {
            return ab_test.variation().cloned().unwrap_or_default();
        }

        let key = assignment_key(ab_test.key());

        let corrupt = match self.stored_variation(&key).await {
            Stored::Pinned(stored) => {
                record_assignment("cached");
                debug!(experiment = ab_test.key(), variation = %stored, "Using pinned variation");
                return stored;
            }
            Stored::Absent => false,
            Stored::Corrupt => true,
        };

        let Some(fresh) = ab_test.variation().cloned() else {
            record_assignment("default");
            return Variation::Control;
        };

        // Undecodable records are overwritten
        let written = if corrupt {
            self.store.set(&key, &fresh).await.map(|()| true)
        } else {
            self.store.set_if_absent(&key, &fresh).await
        };

        match written {
            Ok(true) => {
                record_assignment("assigned");
                info!(experiment = ab_test.key(), variation = %fresh, "Pinned variation");
                fresh
            }
            // Another caller pinned first; its value wins
            Ok(false) => {
                record_assignment("cached");
                match self.stored_variation(&key).await {
                    Stored::Pinned(stored) => stored,
                    Stored::Absent | Stored::Corrupt => fresh,
                }
            }
            Err(e) => {
                record_assignment("unpersisted");
                warn!(
                    experiment = ab_test.key(),
                    variation = %fresh,
                    error = %e,
                    "Failed to persist variation, honoring it for this call only"
                );
                fresh
            }
        }
    }

    /// Pinned assignment for an experiment, if any
    pub async fn assigned(
        &self,
        experiment_key: &str,
    ) -> Result<Option<AssignmentRecord>, DomainError> {
        let variation: Option<Variation> = self.store.get(&assignment_key(experiment_key)).await?;

        Ok(variation.map(|variation| AssignmentRecord::new(experiment_key, variation)))
    }

    /// Drops every pinned variation, returning how many were removed
    pub async fn reset(&self) -> Result<usize, DomainError> {
        let removed = self.store.remove_prefix(ASSIGNMENT_KEY_PREFIX).await?;
        info!(removed, "Reset variation assignments");
        Ok(removed)
    }

    async fn stored_variation(&self, key: &str) -> Stored {
        match self.store.get(key).await {
            Ok(Some(stored)) => Stored::Pinned(stored),
            Ok(None) => Stored::Absent,
            Err(e @ DomainError::Serialization { .. }) => {
                warn!(key, error = %e, "Stored variation is unreadable, replacing it");
                Stored::Corrupt
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read variation, treating as unassigned");
                Stored::Absent
            }
        }
    }
}

/// What the store holds for an assignment key
enum Stored {
    Pinned(Variation),
    Absent,
    Corrupt,
}

fn record_assignment(outcome: &'static str) {
    counter!("ab_test_assignments_total", "outcome" => outcome).increment(1);
}
