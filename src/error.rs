use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolCallError>;

#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unexpected record kind `{found}`, expected `{expected}`")]
    UnexpectedKind { expected: String, found: String },
    #[error("tool call `{0}` already exists in session")]
    DuplicateToolCall(String),
    #[error("tool call `{0}` not found")]
    ToolCallNotFound(String),
    #[error("store error: {0}")]
    Store(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
