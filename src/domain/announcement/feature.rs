//! Feature announcement entities

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single "what's new" entry shown for an app version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub title: String,
    #[serde(alias = "subtitle", default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learn_more_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_base64: Option<String>,
}

impl Feature {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            learn_more_url: None,
            icon_url: None,
            icon_base64: None,
        }
    }

    pub fn with_learn_more_url(mut self, url: impl Into<String>) -> Self {
        self.learn_more_url = Some(url.into());
        self
    }

    pub fn with_icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }
}

/// App version that keys the announcements cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppVersion(String);

impl AppVersion {
    pub fn new(version: impl AsRef<str>) -> Result<Self, DomainError> {
        let version = version.as_ref().trim();

        if version.is_empty() {
            return Err(DomainError::validation("App version cannot be empty"));
        }

        if version.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(format!(
                "App version '{}' cannot contain whitespace",
                version
            )));
        }

        Ok(Self(version.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
