//! WIQL query text and the wire shapes of the work-item endpoints.

use serde::{Deserialize, Serialize};

use scrumwatch_core::WorkItemId;

const TITLE_FIELD: &str = "System.Title";
const STATE_FIELD: &str = "System.State";
const TARGET_DATE_FIELD: &str = "Microsoft.VSTS.Scheduling.TargetDate";

/// Builds the delayed-task query.
///
/// The target date is compared with `=`, so only items due exactly
/// `overdue_days` before today match.
pub fn delayed_tasks_query(work_item_type: &str, done_state: &str, overdue_days: u32) -> String {
    format!(
        "SELECT [System.Id], [{TITLE_FIELD}], [{STATE_FIELD}], [{TARGET_DATE_FIELD}] \
         FROM WorkItems \
         WHERE [System.WorkItemType] = '{work_item_type}' \
         AND [{STATE_FIELD}] <> '{done_state}' \
         AND [{TARGET_DATE_FIELD}] = @today - {overdue_days}"
    )
}

#[derive(Debug, Serialize)]
pub(crate) struct WiqlRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WiqlResponse {
    #[serde(rename = "workItems")]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkItemReference {
    pub id: WorkItemId,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkItemDetail {
    pub fields: WorkItemFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkItemFields {
    #[serde(rename = "System.Title")]
    pub title: String,
    #[serde(rename = "System.State")]
    pub state: String,
    #[serde(rename = "Microsoft.VSTS.Scheduling.TargetDate", default)]
    pub target_date: Option<String>,
}
