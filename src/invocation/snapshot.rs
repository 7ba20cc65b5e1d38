use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ToolCallError};

use super::types::{
    ConfirmationState, MessageText, ToolPresentation, ToolResultDetails, ToolSpecificData,
};

/// 聊天进度条目的判别标签
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatProgressKind {
    ToolInvocation,
    ToolInvocationSerialized,
}

impl ChatProgressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatProgressKind::ToolInvocation => "toolInvocation",
            ChatProgressKind::ToolInvocationSerialized => "toolInvocationSerialized",
        }
    }
}

/// 工具调用的冻结记录，用于持久化与会话回放。不包含实时进度。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedToolInvocation {
    pub kind: ChatProgressKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<ToolPresentation>,
    pub invocation_message: MessageText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_tense_message: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_message: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_confirmed: Option<bool>,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_details: Option<ToolResultDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_specific_data: Option<ToolSpecificData>,
    pub tool_call_id: String,
    pub tool_id: String,
}

impl SerializedToolInvocation {
    pub fn confirmation_state(&self) -> ConfirmationState {
        ConfirmationState::from_flag(self.is_confirmed)
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let content = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(content)
    }

    pub fn from_json(value: Value) -> Result<Self> {
        let found = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let expected = ChatProgressKind::ToolInvocationSerialized.as_str();
        if found != expected {
            return Err(ToolCallError::UnexpectedKind {
                expected: expected.to_string(),
                found,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json(value)
    }
}
