//! Experiment infrastructure - Local variation computation

mod consistent_hashing;

pub use consistent_hashing::{ConsistentHasher, HashedVariationSource};
