// 通用同步原语

mod deferred;
mod observable;

pub use deferred::Deferred;
pub use observable::{ObservableValue, Subscription};
