pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod invocation;
pub mod session;
pub mod state;
pub mod sync;
pub mod utils;

pub use config::{EnvConfig, Settings};
pub use error::{Result, ToolCallError};
pub use i18n::{format_template, CatalogFormatter, MessageFormatter};
pub use invocation::{
    ChatProgressKind, ConfirmationState, InputOutputDetails, MarkdownString, MessageText,
    PreparedToolInvocation, ResultReference, SerializedToolInvocation, TerminalCommandLine,
    TextRange, ToolConfirmationMessages, ToolData, ToolInvocation, ToolPresentation, ToolProgress,
    ToolProgressStep, ToolResult, ToolResultDetails, ToolSpecificData,
};
pub use session::InvocationSession;
#[cfg(feature = "redis-store")]
pub use state::RedisStore;
pub use state::{MemoryStore, SnapshotStore, Transcript};
pub use sync::{Deferred, ObservableValue, Subscription};
pub use utils::logging;
