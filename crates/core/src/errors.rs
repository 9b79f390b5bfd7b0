use std::fmt;

use serde::Serialize;

/// Coarse failure category shared by every remote collaborator.
///
/// Each integration crate keeps its own `thiserror` enum and maps it onto one
/// of these classes so log lines carry a stable `error_class` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Connection, timeout or other transport-level failure.
    Transport,
    /// The remote answered with a non-success HTTP status.
    Status,
    /// The response body did not have the expected shape.
    Decode,
    /// The collaborator was not configured and the call was skipped.
    NotConfigured,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Decode => "decode",
            Self::NotConfigured => "not_configured",
        }
    }

    /// Whether a later attempt could plausibly succeed. Logged as
    /// `error_transient`; nothing in the run retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport | Self::Status)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by the error enums of the remote clients.
pub trait Classified {
    fn class(&self) -> FailureClass;
}
