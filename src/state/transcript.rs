use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::store::SnapshotStore;
use crate::error::Result;
use crate::invocation::SerializedToolInvocation;

pub const DEFAULT_TRANSCRIPT_PREFIX: &str = "transcript";

/// 会话记录：按 tool call id 持久化工具调用快照
#[derive(Clone)]
pub struct Transcript {
    store: Arc<dyn SnapshotStore>,
    prefix: String,
}

impl Transcript {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_prefix(store, DEFAULT_TRANSCRIPT_PREFIX)
    }

    pub fn with_prefix(store: Arc<dyn SnapshotStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key_for(&self, tool_call_id: &str) -> String {
        format!("{}:{tool_call_id}", self.prefix)
    }

    pub async fn record(&self, snapshot: &SerializedToolInvocation) -> Result<()> {
        let content = snapshot.to_json_string(false)?;
        self.store
            .set(&self.key_for(&snapshot.tool_call_id), content)
            .await?;
        debug!(tool_call_id = %snapshot.tool_call_id, "snapshot recorded");
        Ok(())
    }

    pub async fn load(&self, tool_call_id: &str) -> Result<Option<SerializedToolInvocation>> {
        match self.store.get(&self.key_for(tool_call_id)).await? {
            Some(content) => Ok(Some(SerializedToolInvocation::from_json_str(&content)?)),
            None => Ok(None),
        }
    }

    pub async fn load_all(&self) -> Result<Vec<SerializedToolInvocation>> {
        let prefix = format!("{}:", self.prefix);
        let mut snapshots = Vec::new();
        for key in self.store.keys(&prefix).await? {
            if let Some(content) = self.store.get(&key).await? {
                snapshots.push(SerializedToolInvocation::from_json_str(&content)?);
            }
        }
        Ok(snapshots)
    }

    pub async fn remove(&self, tool_call_id: &str) -> Result<()> {
        self.store.delete(&self.key_for(tool_call_id)).await
    }
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript")
            .field("prefix", &self.prefix)
            .finish()
    }
}
