use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map};

use scrumwatch_agent::{IntentClassifier, IntentError, LlmError, RunReport, ScrumBoardAgent};
use scrumwatch_core::{DelayedTask, IntentResult, TaskFetch};
use scrumwatch_devops::{TaskSource, WorkItemError};
use scrumwatch_notify::{NotificationSink, NotifyError};

struct FixedTasks {
    tasks: Vec<DelayedTask>,
    fail: bool,
    calls: AtomicUsize,
}

impl FixedTasks {
    fn new(tasks: Vec<DelayedTask>) -> Self {
        Self { tasks, fail: false, calls: AtomicUsize::new(0) }
    }

    fn failing() -> Self {
        Self { tasks: Vec::new(), fail: true, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl TaskSource for FixedTasks {
    async fn fetch_delayed_tasks(&self) -> Result<TaskFetch, WorkItemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            let decode = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
            return Err(WorkItemError::Decode(decode));
        }
        Ok(TaskFetch { tasks: self.tasks.clone(), skipped: Vec::new() })
    }
}

struct FixedIntent(Option<IntentResult>);

#[async_trait]
impl IntentClassifier for FixedIntent {
    async fn extract(&self, _query: &str) -> Result<IntentResult, IntentError> {
        self.0.clone().ok_or(IntentError::Llm(LlmError::EmptyReply))
    }
}

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
    reject: bool,
}

impl RecordingSink {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("sink lock").clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        if self.reject {
            return Err(NotifyError::Status { status: 500, body: "boom".to_string() });
        }
        self.messages.lock().expect("sink lock").push(message.to_string());
        Ok(())
    }
}

fn task(id: i64, title: &str) -> DelayedTask {
    DelayedTask {
        id,
        title: title.to_string(),
        state: "In Progress".to_string(),
        target_date: Some("2026-10-09T00:00:00Z".to_string()),
    }
}

fn three_tasks() -> Vec<DelayedTask> {
    vec![task(101, "Fix login bug"), task(102, "Update docs"), task(103, "Rotate keys")]
}

fn intent(name: &str, entities: serde_json::Value) -> Option<IntentResult> {
    let entities: Map<String, serde_json::Value> =
        serde_json::from_value(entities).expect("entities object");
    Some(IntentResult::new(name, entities))
}

fn agent(
    tasks: Arc<FixedTasks>,
    classifier: FixedIntent,
    sink: Arc<RecordingSink>,
) -> ScrumBoardAgent {
    ScrumBoardAgent::new(tasks, Arc::new(classifier), sink)
}

#[tokio::test]
async fn no_delayed_tasks_and_no_query_sends_nothing() {
    let tasks = Arc::new(FixedTasks::new(Vec::new()));
    let sink = Arc::new(RecordingSink::default());

    let report = agent(tasks, FixedIntent(None), sink.clone()).run(None).await;

    assert!(sink.messages().is_empty());
    assert_eq!(report, RunReport::default());
}

#[tokio::test]
async fn top_two_query_lists_first_two_titles_and_fetches_once() {
    let tasks = Arc::new(FixedTasks::new(three_tasks()));
    let sink = Arc::new(RecordingSink::default());
    let classifier = FixedIntent(intent("GetDelayedTasks", json!({ "number": "2" })));

    let report =
        agent(tasks.clone(), classifier, sink.clone()).run(Some("Get top 2 delayed tasks?")).await;

    let messages = sink.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("🚨 Delayed Tasks Detected:\n"));
    assert_eq!(
        messages[1],
        "Here are the top 2 delayed tasks:\n- Fix login bug (ID: 101)\n- Update docs (ID: 102)\n"
    );
    assert_eq!(tasks.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.intent.as_deref(), Some("GetDelayedTasks"));
    assert_eq!(report.notifications_sent, 2);
}

#[tokio::test]
async fn non_numeric_count_is_reported_to_the_user() {
    let tasks = Arc::new(FixedTasks::new(Vec::new()));
    let sink = Arc::new(RecordingSink::default());
    let classifier = FixedIntent(intent("GetDelayedTasks", json!({ "number": "abc" })));

    agent(tasks, classifier, sink.clone()).run(Some("Get top abc delayed tasks")).await;

    assert_eq!(
        sink.messages(),
        vec!["Invalid number provided: abc. Please provide a valid number.".to_string()]
    );
}

#[tokio::test]
async fn failed_extraction_echoes_the_query() {
    let tasks = Arc::new(FixedTasks::new(Vec::new()));
    let sink = Arc::new(RecordingSink::default());

    let report = agent(tasks, FixedIntent(None), sink.clone()).run(Some("Gibberish?")).await;

    assert_eq!(sink.messages(), vec!["Sorry, I could not understand the query: Gibberish?"]);
    assert_eq!(report.intent.as_deref(), Some("unknown"));
}

#[tokio::test]
async fn unrecognized_intent_is_named() {
    let tasks = Arc::new(FixedTasks::new(three_tasks()));
    let sink = Arc::new(RecordingSink::default());
    let classifier = FixedIntent(intent("CreateTask", json!({})));

    agent(tasks, classifier, sink.clone()).run(Some("Create a task")).await;

    assert_eq!(sink.messages().last().map(String::as_str), Some("Intent not recognized: CreateTask"));
}

#[tokio::test]
async fn blank_query_is_treated_as_absent() {
    let tasks = Arc::new(FixedTasks::new(Vec::new()));
    let sink = Arc::new(RecordingSink::default());

    let report = agent(tasks, FixedIntent(None), sink.clone()).run(Some("   ")).await;

    assert!(sink.messages().is_empty());
    assert!(report.intent.is_none());
}

#[tokio::test]
async fn failed_task_query_degrades_to_empty_list() {
    let tasks = Arc::new(FixedTasks::failing());
    let sink = Arc::new(RecordingSink::default());
    let classifier = FixedIntent(intent("GetDelayedTasks", json!({})));

    let report = agent(tasks, classifier, sink.clone()).run(Some("Show delayed tasks")).await;

    assert_eq!(sink.messages(), vec!["Here are the delayed tasks:\n"]);
    assert_eq!(report.delayed_tasks, 0);
}

#[tokio::test]
async fn notification_failures_do_not_abort_the_run() {
    let tasks = Arc::new(FixedTasks::new(three_tasks()));
    let sink = Arc::new(RecordingSink { reject: true, ..RecordingSink::default() });
    let classifier = FixedIntent(intent("GetDelayedTasks", json!({ "number": 1 })));

    let report = agent(tasks, classifier, sink).run(Some("Top task?")).await;

    assert_eq!(report.notifications_sent, 0);
    assert_eq!(report.notifications_failed, 2);
    assert_eq!(report.delayed_tasks, 3);
}

#[tokio::test]
async fn repeated_runs_send_identical_notifications() {
    let tasks = Arc::new(FixedTasks::new(three_tasks()));
    let sink = Arc::new(RecordingSink::default());
    let classifier = FixedIntent(intent("GetDelayedTasks", json!({ "number": "2" })));
    let agent = agent(tasks, classifier, sink.clone());

    let first = agent.run(Some("Get top 2 delayed tasks?")).await;
    let second = agent.run(Some("Get top 2 delayed tasks?")).await;

    let messages = sink.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[..2], messages[2..]);
    assert_eq!(first, second);
}
