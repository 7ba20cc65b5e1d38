// 快照持久化

mod store;
mod transcript;

#[cfg(feature = "redis-store")]
pub use store::redis::RedisStore;
pub use store::{MemoryStore, SnapshotStore};
pub use transcript::{Transcript, DEFAULT_TRANSCRIPT_PREFIX};
