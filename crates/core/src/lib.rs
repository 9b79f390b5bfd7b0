pub mod config;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::intent::{
    CountRequest, IntentResult, GET_DELAYED_TASKS_INTENT, UNKNOWN_INTENT,
};
pub use domain::task::{DelayedTask, SkippedItem, TaskFetch, WorkItemId};
pub use errors::{Classified, FailureClass};
