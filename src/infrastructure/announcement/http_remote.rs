//! HTTP client for the feature announcements endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::announcement::{AnnouncementsRemote, Feature, FeatureRequest};
use crate::domain::DomainError;

pub const DEFAULT_ANNOUNCEMENTS_BASE_URL: &str = "https://public-api.wordpress.com";
const ANNOUNCEMENTS_PATH: &str = "/wpcom/v2/mobile/feature-announcements/";

/// Announcements remote backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpAnnouncementsRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnnouncementsRemote {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    fn announcements_url(&self) -> String {
        format!("{}{}", self.base_url, ANNOUNCEMENTS_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct AnnouncementsResponse {
    #[serde(default)]
    announcements: Vec<AnnouncementPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementPayload {
    #[serde(default)]
    details_url: Option<String>,
    #[serde(default)]
    features: Vec<Feature>,
}

impl AnnouncementsResponse {
    /// Flattens every announcement's features, falling back to the
    /// announcement's details page when a feature has no link of its own
    fn into_features(self) -> Vec<Feature> {
        self.announcements
            .into_iter()
            .flat_map(|announcement| {
                let details_url = announcement
                    .details_url
                    .filter(|url| !url.trim().is_empty());

                announcement.features.into_iter().map(move |mut feature| {
                    if feature.learn_more_url.is_none() {
                        feature.learn_more_url = details_url.clone();
                    }
                    feature
                })
            })
            .collect()
    }
}

#[async_trait]
impl AnnouncementsRemote for HttpAnnouncementsRemote {
    async fn get_features(&self, request: &FeatureRequest) -> Result<Vec<Feature>, DomainError> {
        let response = self
            .client
            .get(self.announcements_url())
            .query(&[
                ("app_id", request.app_id.as_str()),
                ("app_version", request.app_version.as_str()),
                ("_locale", request.locale.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::fetch("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::fetch(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let body: AnnouncementsResponse = response
            .json()
            .await
            .map_err(|e| DomainError::fetch("http", format!("Failed to parse response: {}", e)))?;

        Ok(body.into_features())
    }
}
