use scrumwatch_core::{Classified, FailureClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkItemError {
    #[error("work item request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("work item endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode work item response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Classified for WorkItemError {
    fn class(&self) -> FailureClass {
        match self {
            Self::Transport(_) => FailureClass::Transport,
            Self::Status { .. } => FailureClass::Status,
            Self::Decode(_) => FailureClass::Decode,
        }
    }
}
