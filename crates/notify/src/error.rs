use scrumwatch_core::{Classified, FailureClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no webhook url configured")]
    NotConfigured,
}

impl Classified for NotifyError {
    fn class(&self) -> FailureClass {
        match self {
            Self::Transport(_) => FailureClass::Transport,
            Self::Status { .. } => FailureClass::Status,
            Self::NotConfigured => FailureClass::NotConfigured,
        }
    }
}
