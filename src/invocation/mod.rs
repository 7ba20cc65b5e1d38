// 工具调用生命周期

mod snapshot;
mod types;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::i18n::{CatalogFormatter, MessageFormatter, TOOL_INVOCATION_MESSAGE};
use crate::sync::{Deferred, ObservableValue};

pub use snapshot::{ChatProgressKind, SerializedToolInvocation};
pub use types::{
    ConfirmationState, InputOutputDetails, MarkdownString, MessageText, PreparedToolInvocation,
    ResultReference, TerminalCommandLine, TextRange, ToolConfirmationMessages, ToolData,
    ToolPresentation, ToolProgress, ToolProgressStep, ToolResult, ToolResultDetails,
    ToolSpecificData,
};

#[derive(Default)]
struct InvocationState {
    past_tense_message: Option<MessageText>,
    confirmation_messages: Option<ToolConfirmationMessages>,
    is_confirmed: Option<bool>,
    is_complete: bool,
    result_details: Option<ToolResultDetails>,
    finalized: bool,
}

/// 单次工具调用的可观察状态
///
/// 由会话在工具调用开始时创建，通过 `Arc<ToolInvocation>` 共享给展示层与执行器。
/// 确认门与完成门相互独立，均为单次结算。
pub struct ToolInvocation {
    tool_call_id: String,
    tool_id: String,
    invocation_message: MessageText,
    origin_message: Option<MessageText>,
    presentation: Option<ToolPresentation>,
    tool_specific_data: Option<ToolSpecificData>,
    state: Arc<RwLock<InvocationState>>,
    confirmed: Deferred<bool>,
    completed: Deferred<()>,
    progress: ObservableValue<ToolProgress>,
}

impl ToolInvocation {
    pub fn new(
        prepared: Option<PreparedToolInvocation>,
        tool: &ToolData,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Self::with_formatter(prepared, tool, tool_call_id, &CatalogFormatter::default())
    }

    pub fn with_formatter(
        prepared: Option<PreparedToolInvocation>,
        tool: &ToolData,
        tool_call_id: impl Into<String>,
        formatter: &dyn MessageFormatter,
    ) -> Self {
        let prepared = prepared.unwrap_or_default();
        let tool_call_id = tool_call_id.into();
        let invocation_message = match prepared.invocation_message {
            Some(message) => message,
            None => {
                let display_name = format!("\"{}\"", tool.display_name);
                MessageText::Plain(formatter.format(
                    TOOL_INVOCATION_MESSAGE,
                    "Using {0}",
                    &[display_name.as_str()],
                ))
            }
        };
        let requires_confirmation = prepared.confirmation_messages.is_some();

        let state = Arc::new(RwLock::new(InvocationState {
            past_tense_message: prepared.past_tense_message,
            confirmation_messages: prepared.confirmation_messages,
            ..InvocationState::default()
        }));

        let invocation = Self {
            tool_call_id,
            tool_id: tool.id.clone(),
            invocation_message,
            origin_message: prepared.origin_message,
            presentation: prepared.presentation,
            tool_specific_data: prepared.tool_specific_data,
            state,
            confirmed: Deferred::new(),
            completed: Deferred::new(),
            progress: ObservableValue::new(ToolProgress::default()),
        };

        if !requires_confirmation {
            invocation.state.write().is_confirmed = Some(true);
            invocation.confirmed.complete(true);
        }

        let state = Arc::clone(&invocation.state);
        let call_id = invocation.tool_call_id.clone();
        invocation.confirmed.on_settled(move |confirmed| {
            let mut state = state.write();
            state.is_confirmed = Some(*confirmed);
            state.confirmation_messages = None;
            debug!(tool_call_id = %call_id, confirmed = *confirmed, "tool invocation confirmation resolved");
        });

        let state = Arc::clone(&invocation.state);
        invocation.completed.on_settled(move |_| {
            state.write().is_complete = true;
        });

        debug!(
            tool_call_id = %invocation.tool_call_id,
            tool_id = %invocation.tool_id,
            requires_confirmation,
            "tool invocation created"
        );
        invocation
    }

    pub fn kind(&self) -> ChatProgressKind {
        ChatProgressKind::ToolInvocation
    }

    pub fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn invocation_message(&self) -> &MessageText {
        &self.invocation_message
    }

    pub fn origin_message(&self) -> Option<&MessageText> {
        self.origin_message.as_ref()
    }

    pub fn past_tense_message(&self) -> Option<MessageText> {
        self.state.read().past_tense_message.clone()
    }

    pub fn presentation(&self) -> Option<ToolPresentation> {
        self.presentation
    }

    pub fn tool_specific_data(&self) -> Option<&ToolSpecificData> {
        self.tool_specific_data.as_ref()
    }

    /// 仅在确认待定期间存在
    pub fn confirmation_messages(&self) -> Option<ToolConfirmationMessages> {
        self.state.read().confirmation_messages.clone()
    }

    pub fn is_confirmed(&self) -> Option<bool> {
        self.state.read().is_confirmed
    }

    pub fn confirmation_state(&self) -> ConfirmationState {
        ConfirmationState::from_flag(self.is_confirmed())
    }

    pub fn is_complete(&self) -> bool {
        self.state.read().is_complete
    }

    pub fn result_details(&self) -> Option<ToolResultDetails> {
        self.state.read().result_details.clone()
    }

    /// 确认门。外部决策者（用户或自动批准策略）调用 `complete` 结算。
    pub fn confirmed(&self) -> &Deferred<bool> {
        &self.confirmed
    }

    pub fn confirm(&self, approved: bool) -> bool {
        let settled = self.confirmed.complete(approved);
        if !settled {
            debug!(tool_call_id = %self.tool_call_id, approved, "confirmation already resolved, ignoring");
        }
        settled
    }

    pub async fn wait_for_confirmation(&self) -> bool {
        self.confirmed.wait().await
    }

    pub async fn wait_for_completion(&self) {
        self.completed.wait().await;
    }

    pub fn progress(&self) -> &ObservableValue<ToolProgress> {
        &self.progress
    }

    pub fn accept_progress(&self, step: ToolProgressStep) {
        let increment = match step.increment {
            Some(increment) if increment.is_finite() && increment >= 0.0 => increment,
            Some(increment) => {
                warn!(tool_call_id = %self.tool_call_id, increment, "ignoring invalid progress increment");
                0.0
            }
            None => 0.0,
        };
        let message = step.message;
        self.progress.update(move |prev| ToolProgress {
            progress: prev.progress + increment,
            message,
        });
    }

    /// Returns `true` for the winning call; later calls leave the invocation untouched.
    pub fn complete(&self, result: Option<ToolResult>) -> bool {
        {
            let mut state = self.state.write();
            if state.finalized {
                debug!(tool_call_id = %self.tool_call_id, "tool invocation already completed, ignoring");
                return false;
            }
            state.finalized = true;

            let (message, details) = match result {
                Some(result) => (result.tool_result_message, result.tool_result_details),
                None => (None, None),
            };
            match message {
                Some(MessageText::Plain(text)) if text.is_empty() => {}
                Some(message) => state.past_tense_message = Some(message),
                None => {}
            }
            state.result_details = details;
        }

        self.completed.complete(());
        debug!(tool_call_id = %self.tool_call_id, "tool invocation completed");
        true
    }

    pub fn to_snapshot(&self) -> SerializedToolInvocation {
        let state = self.state.read();
        SerializedToolInvocation {
            kind: ChatProgressKind::ToolInvocationSerialized,
            presentation: self.presentation,
            invocation_message: self.invocation_message.clone(),
            past_tense_message: state.past_tense_message.clone(),
            origin_message: self.origin_message.clone(),
            is_confirmed: state.is_confirmed,
            is_complete: state.is_complete,
            result_details: state.result_details.clone(),
            tool_specific_data: self.tool_specific_data.clone(),
            tool_call_id: self.tool_call_id.clone(),
            tool_id: self.tool_id.clone(),
        }
    }
}

impl fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ToolInvocation")
            .field("tool_call_id", &self.tool_call_id)
            .field("tool_id", &self.tool_id)
            .field("is_confirmed", &state.is_confirmed)
            .field("is_complete", &state.is_complete)
            .finish()
    }
}
