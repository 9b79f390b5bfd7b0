use serde::{Deserialize, Serialize};

use crate::errors::FailureClass;

/// Work-item id as issued by the tracking backend.
pub type WorkItemId = i64;

/// A task whose target date matched the overdue window and whose state is not
/// done. Only built from a complete detail record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedTask {
    pub id: WorkItemId,
    pub title: String,
    pub state: String,
    pub target_date: Option<String>,
}

/// An item listed by the query whose detail fetch failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub id: WorkItemId,
    pub class: FailureClass,
    pub reason: String,
}

/// Outcome of a delayed-task query whose listing step succeeded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskFetch {
    pub tasks: Vec<DelayedTask>,
    pub skipped: Vec<SkippedItem>,
}

impl TaskFetch {
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn into_tasks(self) -> Vec<DelayedTask> {
        self.tasks
    }
}
