//! Notification sink for chat webhooks.
//!
//! [`NotificationSink::send`] reports delivery failures to the caller;
//! [`NotificationSink::send_notification`] logs them and returns, so a failed
//! post never interrupts a run.

pub mod error;
pub mod teams;

use async_trait::async_trait;
use tracing::{error, warn};

use scrumwatch_core::{Classified, FailureClass};

pub use error::NotifyError;
pub use teams::TeamsWebhook;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> Result<(), NotifyError>;

    /// Sends `message`, logging instead of returning any failure. Returns
    /// whether the message was delivered.
    async fn send_notification(&self, message: &str) -> bool {
        match self.send(message).await {
            Ok(()) => true,
            Err(err) if err.class() == FailureClass::NotConfigured => {
                warn!(
                    event_name = "notify.dropped",
                    channel = self.name(),
                    "no webhook configured; notification dropped"
                );
                false
            }
            Err(err) => {
                error!(
                    event_name = "notify.failed",
                    channel = self.name(),
                    error_class = %err.class(),
                    error_transient = err.class().is_transient(),
                    error = %err,
                    "error sending notification"
                );
                false
            }
        }
    }
}
