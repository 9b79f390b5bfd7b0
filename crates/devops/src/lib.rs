//! Work-item query client for Azure DevOps.
//!
//! [`AzureDevOpsClient`] runs a WIQL query for overdue tasks and then fetches
//! the fields of every listed item one request at a time. A failed listing is
//! an error; a failed detail fetch drops only that item.

pub mod client;
pub mod error;
pub mod wiql;

use async_trait::async_trait;
use tracing::error;

use scrumwatch_core::{Classified, DelayedTask, TaskFetch};

pub use client::AzureDevOpsClient;
pub use error::WorkItemError;

#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_delayed_tasks(&self) -> Result<TaskFetch, WorkItemError>;

    /// Degrading form of [`TaskSource::fetch_delayed_tasks`]: a failed listing
    /// is logged and reported as no delayed tasks.
    async fn get_delayed_tasks(&self) -> Vec<DelayedTask> {
        match self.fetch_delayed_tasks().await {
            Ok(fetch) => fetch.into_tasks(),
            Err(err) => {
                error!(
                    event_name = "devops.query.failed",
                    error_class = %err.class(),
                    error_transient = err.class().is_transient(),
                    error = %err,
                    "error fetching delayed tasks"
                );
                Vec::new()
            }
        }
    }
}
