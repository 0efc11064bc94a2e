//! Feature announcements synchronization service

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::domain::announcement::{
    AnnouncementsDocument, AnnouncementsRemote, AppVersion, Feature, FeatureRequest, FetchOutcome,
    FEATURE_ANNOUNCEMENTS_KEY,
};
use crate::domain::store::{KeyValueStore, KeyValueStoreExt};
use crate::domain::DomainError;

/// App identifier of the WooCommerce mobile app
pub const DEFAULT_APP_ID: &str = "4";

/// Identity of the app requesting announcements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementsSettings {
    pub app_id: String,
    pub app_version: AppVersion,
    pub locale: String,
}

impl AnnouncementsSettings {
    pub fn new(app_version: AppVersion) -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            app_version,
            locale: "en_US".to_string(),
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    fn request(&self) -> FeatureRequest {
        FeatureRequest::new(&self.app_id, self.app_version.clone(), &self.locale)
    }
}

/// Returns the announcements of the current app version, preferring the
/// persisted copy and fetching only on a miss
///
/// Failures never reach the caller: a failed fetch yields an empty outcome
/// and storage errors are treated as cache misses.
pub struct AnnouncementsSynchronizer {
    store: Arc<dyn KeyValueStore>,
    remote: Arc<dyn AnnouncementsRemote>,
    settings: AnnouncementsSettings,
}

impl fmt::Debug for AnnouncementsSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnouncementsSynchronizer")
            .field("store", &self.store)
            .field("remote", &"<AnnouncementsRemote>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl AnnouncementsSynchronizer {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn AnnouncementsRemote>,
        settings: AnnouncementsSettings,
    ) -> Self {
        Self {
            store,
            remote,
            settings,
        }
    }

    pub fn app_version(&self) -> &AppVersion {
        &self.settings.app_version
    }

    /// Synchronizes the announcements of the configured app version
    ///
    /// Dropping the returned future before the fetch completes persists
    /// nothing.
    pub async fn synchronize(&self) -> FetchOutcome {
        self.synchronize_until(std::future::pending())
            .await
            .unwrap_or_else(FetchOutcome::empty)
    }

    /// Like [`Self::synchronize`], but gives up when `cancel` resolves before
    /// the remote answers
    ///
    /// Returns `None` on cancellation; the store is left untouched.
    pub async fn synchronize_until<C>(&self, cancel: C) -> Option<FetchOutcome>
    where
        C: Future<Output = ()>,
    {
        if let Some(features) = self.load_saved_features().await {
            counter!("announcements_cache_hits_total").increment(1);
            debug!(
                version = %self.settings.app_version,
                count = features.len(),
                "Serving cached announcements"
            );
            return Some(FetchOutcome::cached(features));
        }

        counter!("announcements_cache_misses_total").increment(1);

        let request = self.settings.request();
        let result = tokio::select! {
            biased;
            _ = cancel => {
                info!(version = %self.settings.app_version, "Announcements fetch cancelled");
                return None;
            }
            result = self.remote.get_features(&request) => result,
        };

        let outcome = match result {
            Ok(features) => {
                info!(
                    version = %self.settings.app_version,
                    count = features.len(),
                    "Fetched announcements"
                );

                if let Err(e) = self.save_features(&features).await {
                    warn!(
                        version = %self.settings.app_version,
                        error = %e,
                        "Failed to persist announcements"
                    );
                }

                FetchOutcome::fetched(features)
            }
            Err(e) => {
                counter!("announcements_fetch_failures_total").increment(1);
                warn!(
                    version = %self.settings.app_version,
                    error = %e,
                    "Failed to fetch announcements"
                );
                FetchOutcome::empty()
            }
        };

        Some(outcome)
    }

    /// Removes the persisted announcements document
    pub async fn clear(&self) -> Result<bool, DomainError> {
        self.store.remove(FEATURE_ANNOUNCEMENTS_KEY).await
    }

    /// Cached features of the current version; `None` when absent or empty
    async fn load_saved_features(&self) -> Option<Vec<Feature>> {
        let document: AnnouncementsDocument = match self.store.get(FEATURE_ANNOUNCEMENTS_KEY).await
        {
            Ok(Some(document)) => document,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached announcements, treating as miss");
                return None;
            }
        };

        document
            .get(&self.settings.app_version)
            .filter(|features| !features.is_empty())
            .cloned()
    }

    /// Replaces the whole document so only the current version is retained
    async fn save_features(&self, features: &[Feature]) -> Result<(), DomainError> {
        let mut document = AnnouncementsDocument::new();
        document.insert(self.settings.app_version.clone(), features.to_vec());

        self.store.set(FEATURE_ANNOUNCEMENTS_KEY, &document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::announcement::MockAnnouncementsRemote;
    use crate::domain::store::MockStore;
    use crate::infrastructure::services::recorder::CountingRecorder;
    use crate::infrastructure::store::{FileStore, InMemoryStore};
    use async_trait::async_trait;
    use std::time::Duration;

    fn version(v: &str) -> AppVersion {
        AppVersion::new(v).unwrap()
    }

    fn feature_x() -> Feature {
        Feature::new("Feature X", "Something new").with_icon_url("https://example.com/x.png")
    }

    fn document(v: &str, features: Vec<Feature>) -> AnnouncementsDocument {
        let mut document = AnnouncementsDocument::new();
        document.insert(version(v), features);
        document
    }

    fn remote_returning(features: Vec<Feature>, times: usize) -> MockAnnouncementsRemote {
        let mut remote = MockAnnouncementsRemote::new();
        remote
            .expect_get_features()
            .times(times)
            .returning(move |_| Ok(features.clone()));
        remote
    }

    fn synchronizer(
        store: Arc<dyn KeyValueStore>,
        remote: MockAnnouncementsRemote,
        v: &str,
    ) -> AnnouncementsSynchronizer {
        AnnouncementsSynchronizer::new(
            store,
            Arc::new(remote),
            AnnouncementsSettings::new(version(v)),
        )
    }

    async fn stored_document(store: &dyn KeyValueStore) -> Option<AnnouncementsDocument> {
        store.get(FEATURE_ANNOUNCEMENTS_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn test_cached_entry_served_without_fetch() {
        let store = Arc::new(
            MockStore::new().with_entry(FEATURE_ANNOUNCEMENTS_KEY, &document("1.0", vec![feature_x()])),
        );
        let sync = synchronizer(store.clone(), remote_returning(vec![], 0), "1.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::cached(vec![feature_x()]));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_persists_only_current_version() {
        let store = Arc::new(InMemoryStore::new());
        let sync = synchronizer(store.clone(), remote_returning(vec![feature_x()], 1), "1.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::fetched(vec![feature_x()]));
        assert_eq!(
            stored_document(store.as_ref()).await,
            Some(document("1.0", vec![feature_x()]))
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_empty_and_writes_nothing() {
        let store = Arc::new(MockStore::new());
        let mut remote = MockAnnouncementsRemote::new();
        remote
            .expect_get_features()
            .times(1)
            .returning(|_| Err(DomainError::fetch("mock", "offline")));
        let sync = synchronizer(store.clone(), remote, "1.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::empty());
        assert_eq!(store.write_count(), 0);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_call_is_served_from_cache() {
        let store = Arc::new(InMemoryStore::new());
        let sync = synchronizer(store, remote_returning(vec![feature_x()], 1), "1.0");

        let first = sync.synchronize().await;
        let second = sync.synchronize().await;

        assert_eq!(first, FetchOutcome::fetched(vec![feature_x()]));
        assert_eq!(second, FetchOutcome::cached(vec![feature_x()]));
        assert_eq!(first.features, second.features);
    }

    #[tokio::test]
    async fn test_version_bump_misses_and_replaces_stale_entry() {
        let store = Arc::new(MockStore::new().with_entry(
            FEATURE_ANNOUNCEMENTS_KEY,
            &document("1.0", vec![feature_x()]),
        ));
        let feature_y = Feature::new("Feature Y", "Even newer");
        let mut remote = MockAnnouncementsRemote::new();
        let expected = feature_y.clone();
        remote
            .expect_get_features()
            .withf(|request| request.app_version.as_str() == "2.0" && request.app_id == "4")
            .times(1)
            .returning(move |_| Ok(vec![expected.clone()]));
        let sync = synchronizer(store.clone(), remote, "2.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::fetched(vec![feature_y.clone()]));
        assert_eq!(
            stored_document(store.as_ref()).await,
            Some(document("2.0", vec![feature_y]))
        );
    }

    #[tokio::test]
    async fn test_empty_cached_entry_counts_as_miss() {
        let store = Arc::new(
            MockStore::new().with_entry(FEATURE_ANNOUNCEMENTS_KEY, &document("1.0", vec![])),
        );
        let sync = synchronizer(store, remote_returning(vec![feature_x()], 1), "1.0");

        let outcome = sync.synchronize().await;

        assert!(!outcome.served_from_cache);
        assert_eq!(outcome.features, vec![feature_x()]);
    }

    #[tokio::test]
    async fn test_read_error_is_treated_as_miss() {
        let store = Arc::new(MockStore::new().with_read_error("disk unavailable"));
        let sync = synchronizer(store, remote_returning(vec![feature_x()], 1), "1.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::fetched(vec![feature_x()]));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_treated_as_miss() {
        let store = Arc::new(MockStore::new().with_raw_entry(FEATURE_ANNOUNCEMENTS_KEY, "[1, 2"));
        let sync = synchronizer(store, remote_returning(vec![feature_x()], 1), "1.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::fetched(vec![feature_x()]));
    }

    #[tokio::test]
    async fn test_write_error_still_returns_features() {
        let store = Arc::new(MockStore::new().with_write_error("read-only volume"));
        let sync = synchronizer(store.clone(), remote_returning(vec![feature_x()], 1), "1.0");

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::fetched(vec![feature_x()]));
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_settings() {
        let store = Arc::new(InMemoryStore::new());
        let mut remote = MockAnnouncementsRemote::new();
        remote
            .expect_get_features()
            .withf(|request| {
                request.app_id == "9" && request.locale == "fr_FR" && request.app_version.as_str() == "3.1"
            })
            .times(1)
            .returning(|_| Ok(vec![]));
        let settings = AnnouncementsSettings::new(version("3.1"))
            .with_app_id("9")
            .with_locale("fr_FR");
        let sync = AnnouncementsSynchronizer::new(store, Arc::new(remote), settings);

        let outcome = sync.synchronize().await;

        assert_eq!(outcome, FetchOutcome::empty());
    }

    /// Remote that answers only after a delay
    struct SlowRemote {
        delay: Duration,
        features: Vec<Feature>,
    }

    #[async_trait]
    impl AnnouncementsRemote for SlowRemote {
        async fn get_features(&self, _request: &FeatureRequest) -> Result<Vec<Feature>, DomainError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.features.clone())
        }
    }

    #[tokio::test]
    async fn test_cancellation_before_fetch_completes_persists_nothing() {
        let store = Arc::new(MockStore::new());
        let remote = SlowRemote {
            delay: Duration::from_secs(30),
            features: vec![feature_x()],
        };
        let sync = AnnouncementsSynchronizer::new(
            store.clone(),
            Arc::new(remote),
            AnnouncementsSettings::new(version("1.0")),
        );

        let outcome = sync
            .synchronize_until(tokio::time::sleep(Duration::from_millis(10)))
            .await;

        assert!(outcome.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_signal_ignored_on_cache_hit() {
        let store = Arc::new(
            MockStore::new().with_entry(FEATURE_ANNOUNCEMENTS_KEY, &document("1.0", vec![feature_x()])),
        );
        let sync = synchronizer(store, remote_returning(vec![], 0), "1.0");

        let outcome = sync.synchronize_until(std::future::ready(())).await;

        assert_eq!(outcome, Some(FetchOutcome::cached(vec![feature_x()])));
    }

    #[tokio::test]
    async fn test_uncancelled_slow_fetch_completes() {
        let store = Arc::new(InMemoryStore::new());
        let remote = SlowRemote {
            delay: Duration::from_millis(10),
            features: vec![feature_x()],
        };
        let sync = AnnouncementsSynchronizer::new(
            store,
            Arc::new(remote),
            AnnouncementsSettings::new(version("1.0")),
        );

        let outcome = sync
            .synchronize_until(tokio::time::sleep(Duration::from_secs(30)))
            .await;

        assert_eq!(outcome, Some(FetchOutcome::fetched(vec![feature_x()])));
    }

    #[tokio::test]
    async fn test_clear_removes_document() {
        let store = Arc::new(InMemoryStore::new());
        let sync = synchronizer(store.clone(), remote_returning(vec![feature_x()], 2), "1.0");

        sync.synchronize().await;
        assert!(sync.clear().await.unwrap());

        let outcome = sync.synchronize().await;
        assert!(!outcome.served_from_cache);
    }

    #[tokio::test]
    async fn test_corrupt_cache_file_recovers_after_one_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature-announcements.json");
        tokio::fs::write(&path, b"{ truncated").await.unwrap();
        let sync = synchronizer(
            Arc::new(FileStore::new(&path)),
            remote_returning(vec![feature_x()], 1),
            "1.0",
        );

        let first = sync.synchronize().await;
        let second = sync.synchronize().await;

        assert_eq!(first, FetchOutcome::fetched(vec![feature_x()]));
        assert_eq!(second, FetchOutcome::cached(vec![feature_x()]));
    }

    #[test]
    fn test_cache_and_fetch_counters() {
        let recorder = CountingRecorder::new();
        let sync = synchronizer(
            Arc::new(MockStore::new()),
            remote_returning(vec![feature_x()], 1),
            "1.0",
        );
        let mut offline = MockAnnouncementsRemote::new();
        offline
            .expect_get_features()
            .times(1)
            .returning(|_| Err(DomainError::fetch("mock", "offline")));
        let failing = synchronizer(Arc::new(MockStore::new()), offline, "1.0");

        recorder.run(async {
            sync.synchronize().await;
            sync.synchronize().await;
            failing.synchronize().await;
        });

        assert_eq!(recorder.count("announcements_cache_misses_total"), 2);
        assert_eq!(recorder.count("announcements_cache_hits_total"), 1);
        assert_eq!(recorder.count("announcements_fetch_failures_total"), 1);
    }
}
