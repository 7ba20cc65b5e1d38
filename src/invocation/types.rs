use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 显示文本：纯文本或 Markdown
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Plain(String),
    Markdown(MarkdownString),
}

impl MessageText {
    pub fn plain(text: impl Into<String>) -> Self {
        MessageText::Plain(text.into())
    }

    pub fn markdown(value: impl Into<String>) -> Self {
        MessageText::Markdown(MarkdownString::new(value))
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageText::Plain(text) => text,
            MessageText::Markdown(markdown) => &markdown.value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MessageText {
    fn from(text: &str) -> Self {
        MessageText::Plain(text.to_string())
    }
}

impl From<String> for MessageText {
    fn from(text: String) -> Self {
        MessageText::Plain(text)
    }
}

impl From<MarkdownString> for MessageText {
    fn from(markdown: MarkdownString) -> Self {
        MessageText::Markdown(markdown)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownString {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trusted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_theme_icons: Option<bool>,
}

impl MarkdownString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn trusted(mut self) -> Self {
        self.is_trusted = Some(true);
        self
    }
}

/// 工具定义描述
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolData {
    pub id: String,
    pub display_name: String,
}

impl ToolData {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfirmationMessages {
    pub title: String,
    pub message: MessageText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_auto_confirm: Option<bool>,
}

impl ToolConfirmationMessages {
    pub fn new(title: impl Into<String>, message: impl Into<MessageText>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            allow_auto_confirm: None,
        }
    }

    pub fn with_auto_confirm(mut self, allow: bool) -> Self {
        self.allow_auto_confirm = Some(allow);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolPresentation {
    Hidden,
    HiddenAfterComplete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalCommandLine {
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_edited: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_edited: Option<String>,
}

/// 工具特定数据，由生产者与展示层解释；本模块只负责原样携带
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToolSpecificData {
    Terminal {
        command: String,
        language: String,
    },
    #[serde(rename_all = "camelCase")]
    Terminal2 {
        command_line: TerminalCommandLine,
        language: String,
    },
    #[serde(rename_all = "camelCase")]
    Input {
        raw_input: Value,
    },
    Extensions {
        extensions: Vec<String>,
    },
    Tasks {
        tasks: Vec<Value>,
    },
}

/// 调用前准备好的展示/确认提示
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedToolInvocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_message: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_tense_message: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_message: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_messages: Option<ToolConfirmationMessages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<ToolPresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_specific_data: Option<ToolSpecificData>,
}

impl PreparedToolInvocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invocation_message(mut self, message: impl Into<MessageText>) -> Self {
        self.invocation_message = Some(message.into());
        self
    }

    pub fn with_past_tense_message(mut self, message: impl Into<MessageText>) -> Self {
        self.past_tense_message = Some(message.into());
        self
    }

    pub fn with_origin_message(mut self, message: impl Into<MessageText>) -> Self {
        self.origin_message = Some(message.into());
        self
    }

    pub fn with_confirmation(mut self, messages: ToolConfirmationMessages) -> Self {
        self.confirmation_messages = Some(messages);
        self
    }

    pub fn with_presentation(mut self, presentation: ToolPresentation) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn with_tool_specific_data(mut self, data: ToolSpecificData) -> Self {
        self.tool_specific_data = Some(data);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultReference {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<TextRange>,
}

impl ResultReference {
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            range: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutputDetails {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultDetails {
    References(Vec<ResultReference>),
    InputOutput(InputOutputDetails),
}

/// 工具执行结果（失败也通过结果内容表达）
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result_message: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result_details: Option<ToolResultDetails>,
}

impl ToolResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<MessageText>) -> Self {
        self.tool_result_message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: ToolResultDetails) -> Self {
        self.tool_result_details = Some(details);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolProgressStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageText>,
}

impl ToolProgressStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(mut self, increment: f64) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn message(mut self, message: impl Into<MessageText>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolProgress {
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageText>,
}

/// 确认子状态机
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfirmationState {
    Pending,
    Confirmed,
    Denied,
}

impl ConfirmationState {
    pub fn from_flag(is_confirmed: Option<bool>) -> Self {
        match is_confirmed {
            None => ConfirmationState::Pending,
            Some(true) => ConfirmationState::Confirmed,
            Some(false) => ConfirmationState::Denied,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationState::Pending => "pending",
            ConfirmationState::Confirmed => "confirmed",
            ConfirmationState::Denied => "denied",
        }
    }
}
