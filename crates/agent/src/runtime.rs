use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use scrumwatch_core::DelayedTask;
use scrumwatch_devops::TaskSource;
use scrumwatch_notify::NotificationSink;

use crate::intent::IntentClassifier;
use crate::messages::{delayed_tasks_alert, query_response};

/// Summary of one agent run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub delayed_tasks: usize,
    pub intent: Option<String>,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

/// Checks for delayed tasks and answers an optional user query.
///
/// Each collaborator swallows its own failures, so a run always completes.
/// Tasks are fetched once per run and shared by the alert and the query reply.
pub struct ScrumBoardAgent {
    tasks: Arc<dyn TaskSource>,
    classifier: Arc<dyn IntentClassifier>,
    sink: Arc<dyn NotificationSink>,
}

impl ScrumBoardAgent {
    pub fn new(
        tasks: Arc<dyn TaskSource>,
        classifier: Arc<dyn IntentClassifier>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self { tasks, classifier, sink }
    }

    pub async fn run(&self, user_query: Option<&str>) -> RunReport {
        let mut report = RunReport::default();

        let tasks = self.tasks.get_delayed_tasks().await;
        report.delayed_tasks = tasks.len();
        self.handle_delayed_tasks(&tasks, &mut report).await;

        if let Some(query) = user_query.filter(|query| !query.trim().is_empty()) {
            self.handle_user_query(query, &tasks, &mut report).await;
        }

        info!(
            event_name = "agent.run.completed",
            delayed_tasks = report.delayed_tasks,
            intent = report.intent.as_deref().unwrap_or("none"),
            notifications_sent = report.notifications_sent,
            notifications_failed = report.notifications_failed,
            "agent run completed"
        );
        report
    }

    /// Alerts on `tasks`; stays silent when the list is empty.
    pub async fn handle_delayed_tasks(&self, tasks: &[DelayedTask], report: &mut RunReport) {
        if let Some(message) = delayed_tasks_alert(tasks) {
            self.notify(&message, report).await;
        }
    }

    pub async fn handle_user_query(
        &self,
        query: &str,
        tasks: &[DelayedTask],
        report: &mut RunReport,
    ) {
        let intent = self.classifier.get_intent_and_entities(query).await;
        info!(
            event_name = "agent.query.classified",
            intent = %intent.intent,
            entity_count = intent.entities.len(),
            "user query classified"
        );

        let message = query_response(query, &intent, tasks);
        report.intent = Some(intent.intent);
        self.notify(&message, report).await;
    }

    async fn notify(&self, message: &str, report: &mut RunReport) {
        if self.sink.send_notification(message).await {
            report.notifications_sent += 1;
        } else {
            report.notifications_failed += 1;
        }
    }
}
