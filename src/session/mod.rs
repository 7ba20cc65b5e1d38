// 会话：持有本会话内创建的全部工具调用

use std::collections::HashMap;
use std::sync::Arc;

use futures::future;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolCallError};
use crate::i18n::{CatalogFormatter, MessageFormatter};
use crate::invocation::{
    ConfirmationState, PreparedToolInvocation, SerializedToolInvocation, ToolData, ToolInvocation,
};
use crate::state::Transcript;

#[derive(Default)]
struct SessionEntries {
    order: Vec<String>,
    by_id: HashMap<String, Arc<ToolInvocation>>,
}

/// 工具调用的所属会话
///
/// 只有会话能创建和丢弃调用；展示层通过 `get` 等方法拿到共享引用，
/// 且只能经由 `ToolInvocation` 上公开的操作推进状态。
pub struct InvocationSession {
    session_id: String,
    formatter: Arc<dyn MessageFormatter>,
    entries: RwLock<SessionEntries>,
}

impl InvocationSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_formatter(session_id, Arc::new(CatalogFormatter::default()))
    }

    pub fn with_formatter(
        session_id: impl Into<String>,
        formatter: Arc<dyn MessageFormatter>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            formatter,
            entries: RwLock::new(SessionEntries::default()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn begin(
        &self,
        prepared: Option<PreparedToolInvocation>,
        tool: &ToolData,
        tool_call_id: impl Into<String>,
    ) -> Result<Arc<ToolInvocation>> {
        let tool_call_id = tool_call_id.into();
        let mut entries = self.entries.write();
        if entries.by_id.contains_key(&tool_call_id) {
            return Err(ToolCallError::DuplicateToolCall(tool_call_id));
        }

        let invocation = Arc::new(ToolInvocation::with_formatter(
            prepared,
            tool,
            tool_call_id.clone(),
            self.formatter.as_ref(),
        ));
        entries.order.push(tool_call_id.clone());
        entries.by_id.insert(tool_call_id.clone(), Arc::clone(&invocation));
        info!(session = %self.session_id, %tool_call_id, tool_id = %tool.id, "tool call started");
        Ok(invocation)
    }

    pub fn get(&self, tool_call_id: &str) -> Option<Arc<ToolInvocation>> {
        self.entries.read().by_id.get(tool_call_id).map(Arc::clone)
    }

    pub fn contains(&self, tool_call_id: &str) -> bool {
        self.entries.read().by_id.contains_key(tool_call_id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().order.is_empty()
    }

    /// 按创建顺序返回
    pub fn invocations(&self) -> Vec<Arc<ToolInvocation>> {
        let entries = self.entries.read();
        entries
            .order
            .iter()
            .filter_map(|id| entries.by_id.get(id).map(Arc::clone))
            .collect()
    }

    pub fn pending_confirmations(&self) -> Vec<Arc<ToolInvocation>> {
        self.invocations()
            .into_iter()
            .filter(|invocation| invocation.confirmation_state() == ConfirmationState::Pending)
            .collect()
    }

    pub fn running(&self) -> Vec<Arc<ToolInvocation>> {
        self.invocations()
            .into_iter()
            .filter(|invocation| !invocation.is_complete())
            .collect()
    }

    pub fn snapshots(&self) -> Vec<SerializedToolInvocation> {
        self.invocations()
            .iter()
            .map(|invocation| invocation.to_snapshot())
            .collect()
    }

    pub async fn wait_all_complete(&self) {
        let invocations = self.invocations();
        future::join_all(
            invocations
                .iter()
                .map(|invocation| invocation.wait_for_completion()),
        )
        .await;
    }

    pub fn discard(&self, tool_call_id: &str) -> Result<Arc<ToolInvocation>> {
        let mut entries = self.entries.write();
        let invocation = entries
            .by_id
            .remove(tool_call_id)
            .ok_or_else(|| ToolCallError::ToolCallNotFound(tool_call_id.to_string()))?;
        entries.order.retain(|id| id != tool_call_id);
        debug!(session = %self.session_id, %tool_call_id, "tool call discarded");
        Ok(invocation)
    }

    /// 将当前所有调用的快照写入会话记录，返回写入条数
    #[instrument(skip_all, fields(session = %self.session_id))]
    pub async fn persist(&self, transcript: &Transcript) -> Result<usize> {
        let snapshots = self.snapshots();
        for snapshot in &snapshots {
            transcript.record(snapshot).await?;
        }
        debug!(count = snapshots.len(), "session persisted");
        Ok(snapshots.len())
    }
}
