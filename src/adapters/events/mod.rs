//! Notification adapters.
//!
//! - `InProcessNotificationBus` - Synchronous, in-process delivery
//! - `LoggingListener` - Writes every notification to the log

mod in_process;
mod logging_listener;

pub use in_process::InProcessNotificationBus;
pub use logging_listener::LoggingListener;
