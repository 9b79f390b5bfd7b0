use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use scrumwatch_core::config::DevOpsConfig;
use scrumwatch_core::{Classified, DelayedTask, SkippedItem, TaskFetch};

use crate::error::WorkItemError;
use crate::wiql::{delayed_tasks_query, WiqlRequest, WiqlResponse, WorkItemDetail, WorkItemReference};
use crate::TaskSource;

/// Azure DevOps work-item client. Lists matching items with one WIQL call and
/// then fetches each item's fields individually.
pub struct AzureDevOpsClient {
    http: Client,
    wiql_url: String,
    personal_access_token: SecretString,
    query: String,
    overdue_days: u32,
}

impl AzureDevOpsClient {
    pub fn new(config: &DevOpsConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    pub fn with_http_client(config: &DevOpsConfig, http: Client) -> Self {
        let wiql_url = format!(
            "{}/{}/{}/_apis/wit/wiql?api-version={}",
            config.base_url.trim_end_matches('/'),
            config.organization,
            config.project,
            config.api_version,
        );

        Self {
            http,
            wiql_url,
            personal_access_token: config.personal_access_token.clone(),
            query: delayed_tasks_query(
                &config.work_item_type,
                &config.done_state,
                config.overdue_days,
            ),
            overdue_days: config.overdue_days,
        }
    }

    pub fn wiql_url(&self) -> &str {
        &self.wiql_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth("", Some(self.personal_access_token.expose_secret()))
    }

    async fn list_references(&self) -> Result<Vec<WorkItemReference>, WorkItemError> {
        let request = self.http.post(&self.wiql_url).json(&WiqlRequest { query: &self.query });
        let listing: WiqlResponse = self.send_json(request).await?;
        Ok(listing.work_items)
    }

    async fn fetch_detail(&self, reference: &WorkItemReference) -> Result<DelayedTask, WorkItemError> {
        let detail: WorkItemDetail = self.send_json(self.http.get(&reference.url)).await?;

        Ok(DelayedTask {
            id: reference.id,
            title: detail.fields.title,
            state: detail.fields.state,
            target_date: detail.fields.target_date,
        })
    }

    async fn send_json<T>(&self, request: RequestBuilder) -> Result<T, WorkItemError>
    where
        T: DeserializeOwned,
    {
        let response = self.authorized(request).send().await.map_err(WorkItemError::Transport)?;
        let status = response.status();
        let body = response.text().await.map_err(WorkItemError::Transport)?;

        if !status.is_success() {
            return Err(WorkItemError::Status { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(WorkItemError::Decode)
    }
}

#[async_trait]
impl TaskSource for AzureDevOpsClient {
    async fn fetch_delayed_tasks(&self) -> Result<TaskFetch, WorkItemError> {
        let target_date = Utc::now().date_naive() - Duration::days(i64::from(self.overdue_days));
        debug!(
            event_name = "devops.query.start",
            target_date = %target_date,
            overdue_days = self.overdue_days,
            "querying delayed work items"
        );

        let references = self.list_references().await?;
        let mut fetch = TaskFetch::default();

        for reference in &references {
            match self.fetch_detail(reference).await {
                Ok(task) => fetch.tasks.push(task),
                Err(error) => {
                    warn!(
                        event_name = "devops.detail.skipped",
                        work_item_id = reference.id,
                        error_class = %error.class(),
                        error_transient = error.class().is_transient(),
                        error = %error,
                        "error fetching details for work item; skipping"
                    );
                    fetch.skipped.push(SkippedItem {
                        id: reference.id,
                        class: error.class(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            event_name = "devops.query.completed",
            listed = references.len(),
            delayed = fetch.tasks.len(),
            skipped = fetch.skipped.len(),
            "delayed work item query completed"
        );

        Ok(fetch)
    }
}
