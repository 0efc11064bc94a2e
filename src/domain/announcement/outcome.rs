use serde::{Deserialize, Serialize};

use super::{AppVersion, Feature};

/// Well-known store key of the announcements document
pub const FEATURE_ANNOUNCEMENTS_KEY: &str = "feature-announcements";

/// Persisted announcements document: `{ version: [features] }`
///
/// Only ever holds the entry of the most recently synchronized version.
pub type AnnouncementsDocument = std::collections::BTreeMap<AppVersion, Vec<Feature>>;

/// Result handed to callers of a synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub features: Vec<Feature>,
    pub served_from_cache: bool,
}

impl FetchOutcome {
    pub fn cached(features: Vec<Feature>) -> Self {
        Self {
            features,
            served_from_cache: true,
        }
    }

    pub fn fetched(features: Vec<Feature>) -> Self {
        Self {
            features,
            served_from_cache: false,
        }
    }

    pub fn empty() -> Self {
        Self::fetched(Vec::new())
    }
}
