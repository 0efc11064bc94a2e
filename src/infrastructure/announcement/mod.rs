//! Announcements infrastructure - Remote implementations

mod http_remote;

pub use http_remote::{HttpAnnouncementsRemote, DEFAULT_ANNOUNCEMENTS_BASE_URL};
