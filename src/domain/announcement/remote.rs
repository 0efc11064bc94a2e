//! Remote source of feature announcements

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{AppVersion, Feature};
use crate::domain::DomainError;

/// Parameters of a single announcements request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequest {
    pub app_id: String,
    pub app_version: AppVersion,
    pub locale: String,
}

impl FeatureRequest {
    pub fn new(app_id: impl Into<String>, app_version: AppVersion, locale: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_version,
            locale: locale.into(),
        }
    }
}

/// Fetches announcements for an app version
///
/// One attempt per call; retries are the caller's concern.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AnnouncementsRemote: Send + Sync {
    async fn get_features(&self, request: &FeatureRequest) -> Result<Vec<Feature>, DomainError>;
}
