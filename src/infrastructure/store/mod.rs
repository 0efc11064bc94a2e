//! Store infrastructure - Key-value store implementations

mod factory;
mod file;
mod in_memory;
mod redis;

pub use factory::{
    StoreConfig, StoreFactory, StoreType, Stores, ANNOUNCEMENTS_FILE_NAME, ASSIGNMENTS_FILE_NAME,
};
pub use file::FileStore;
pub use in_memory::InMemoryStore;
pub use redis::{RedisStore, RedisStoreConfig};
