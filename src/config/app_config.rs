use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::announcement::AppVersion;
use crate::domain::DomainError;
use crate::infrastructure::announcement::DEFAULT_ANNOUNCEMENTS_BASE_URL;
use crate::infrastructure::services::{AnnouncementsSettings, DEFAULT_APP_ID};
use crate::infrastructure::store::StoreConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub announcements: AnnouncementsConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where announcements are fetched from and which app asks for them
#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_ANNOUNCEMENTS_BASE_URL.to_string()
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AnnouncementsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_id: default_app_id(),
            app_version: default_app_version(),
            locale: default_locale(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnnouncementsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn settings(&self) -> Result<AnnouncementsSettings, DomainError> {
        let version = AppVersion::new(&self.app_version)?;

        Ok(AnnouncementsSettings::new(version)
            .with_app_id(&self.app_id)
            .with_locale(&self.locale))
    }
}

impl AppConfig {
    /// Loads `config/default`, `config/local` and `APP__*` overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(None)
    }

    /// Like [`Self::load`], with an extra required file layered before the
    /// environment
    pub fn load_with(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::StoreType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.announcements.app_id, "4");
        assert_eq!(config.announcements.locale, "en_US");
        assert_eq!(config.announcements.app_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.store.backend, StoreType::File);
    }

    #[test]
    fn test_settings_from_config() {
        let config = AnnouncementsConfig {
            app_version: " 13.4 ".to_string(),
            locale: "de_DE".to_string(),
            ..Default::default()
        };

        let settings = config.settings().unwrap();

        assert_eq!(settings.app_version.as_str(), "13.4");
        assert_eq!(settings.locale, "de_DE");
        assert_eq!(settings.app_id, "4");
    }

    #[test]
    fn test_settings_rejects_blank_version() {
        let config = AnnouncementsConfig {
            app_version: "".to_string(),
            ..Default::default()
        };

        assert!(config.settings().is_err());
    }

    #[test]
    fn test_timeout_never_zero() {
        let config = AnnouncementsConfig {
            timeout_secs: 0,
            ..Default::default()
        };

        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[logging]
format = "json"

[announcements]
app_version = "20.1"
base_url = "http://localhost:9999"

[store]
backend = "memory"
"#,
        )
        .unwrap();

        let config = AppConfig::load_with(Some(path.as_path())).unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.announcements.app_version, "20.1");
        assert_eq!(config.announcements.base_url, "http://localhost:9999");
        assert_eq!(config.store.backend, StoreType::InMemory);
    }

    #[test]
    fn test_load_with_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = AppConfig::load_with(Some(dir.path().join("absent.toml").as_path()));
        assert!(result.is_err());
    }
}
