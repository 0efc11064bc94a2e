//! Infrastructure services

mod announcement_service;
mod variation_service;

#[cfg(test)]
pub(crate) mod recorder;

pub use announcement_service::{AnnouncementsSettings, AnnouncementsSynchronizer, DEFAULT_APP_ID};
pub use variation_service::CachedVariationProvider;
