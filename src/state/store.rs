use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;

/// 快照存储 trait
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// 内存存储实现
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.inner.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .inner
            .read()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(feature = "redis-store")]
pub mod redis {
    use super::*;
    use crate::error::ToolCallError;
    use ::redis::AsyncCommands;

    const SCAN_BATCH: usize = 100;

    pub struct RedisStore {
        client: ::redis::Client,
    }

    impl RedisStore {
        pub fn new(client: ::redis::Client) -> Self {
            Self { client }
        }

        async fn connection(&self) -> Result<::redis::aio::MultiplexedConnection> {
            self.client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| ToolCallError::Store(e.to_string()))
        }
    }

    #[async_trait]
    impl SnapshotStore for RedisStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn
                .get(key)
                .await
                .map_err(|e| ToolCallError::Store(e.to_string()))?;
            Ok(value)
        }

        async fn set(&self, key: &str, value: String) -> Result<()> {
            let mut conn = self.connection().await?;
            let _: () = conn
                .set(key, value)
                .await
                .map_err(|e| ToolCallError::Store(e.to_string()))?;
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            let mut conn = self.connection().await?;
            let _: () = conn
                .del(key)
                .await
                .map_err(|e| ToolCallError::Store(e.to_string()))?;
            Ok(())
        }

        async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
            let mut conn = self.connection().await?;
            let pattern = format!("{prefix}*");
            let mut cursor: u64 = 0;
            let mut keys = Vec::new();
            // SCAN 增量遍历，避免 KEYS 阻塞服务端
            loop {
                let (next, batch): (u64, Vec<String>) = ::redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| ToolCallError::Store(e.to_string()))?;
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            keys.sort();
            keys.dedup();
            Ok(keys)
        }
    }
}
