//! Announcements Sync
//!
//! Cache-or-fetch synchronization of "what's new" feature announcements and
//! sticky A/B test variation caching:
//! - Announcements are fetched once per app version and served from the
//!   persisted copy afterwards
//! - Logged-out experiment variations are pinned on first exposure
//! - Pluggable stores (in-memory, JSON file, Redis)

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use infrastructure::{
    announcement::HttpAnnouncementsRemote,
    services::{AnnouncementsSynchronizer, CachedVariationProvider},
    store::StoreFactory,
};

/// Services wired from configuration
///
/// Constructed once by the binary and passed to whatever needs it.
#[derive(Debug)]
pub struct AppServices {
    pub synchronizer: AnnouncementsSynchronizer,
    pub variations: CachedVariationProvider,
}

/// Builds the service graph described by `config`
pub async fn create_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let stores = StoreFactory::new().create(&config.store).await?;

    let remote = HttpAnnouncementsRemote::new(
        config.announcements.base_url.clone(),
        config.announcements.timeout(),
    )?;

    let synchronizer = AnnouncementsSynchronizer::new(
        stores.announcements,
        Arc::new(remote),
        config.announcements.settings()?,
    );

    let variations = CachedVariationProvider::new(stores.assignments);

    tracing::debug!(
        store = %config.store.backend,
        version = %synchronizer.app_version(),
        "Services created"
    );

    Ok(AppServices {
        synchronizer,
        variations,
    })
}
