//! Feature announcements domain module

mod feature;
mod outcome;
mod remote;

pub use feature::{AppVersion, Feature};
pub use outcome::{AnnouncementsDocument, FetchOutcome, FEATURE_ANNOUNCEMENTS_KEY};
pub use remote::{AnnouncementsRemote, FeatureRequest};

#[cfg(test)]
pub use remote::MockAnnouncementsRemote;
