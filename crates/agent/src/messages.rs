//! Notification text for delayed-task alerts and query responses.

use scrumwatch_core::{CountRequest, DelayedTask, IntentResult, GET_DELAYED_TASKS_INTENT};

pub const ALERT_HEADER: &str = "🚨 Delayed Tasks Detected:\n";

fn push_task_lines<'a>(message: &mut String, tasks: impl IntoIterator<Item = &'a DelayedTask>) {
    for task in tasks {
        message.push_str(&format!("- {} (ID: {})\n", task.title, task.id));
    }
}

/// The run's opening alert, or `None` when nothing is delayed.
pub fn delayed_tasks_alert(tasks: &[DelayedTask]) -> Option<String> {
    if tasks.is_empty() {
        return None;
    }

    let mut message = ALERT_HEADER.to_string();
    push_task_lines(&mut message, tasks);
    Some(message)
}

/// Chooses the reply to a classified user query.
pub fn query_response(query: &str, intent: &IntentResult, tasks: &[DelayedTask]) -> String {
    if intent.intent == GET_DELAYED_TASKS_INTENT {
        return delayed_tasks_response(intent.count_request(), tasks);
    }

    if intent.is_unknown() {
        return format!("Sorry, I could not understand the query: {query}");
    }

    format!("Intent not recognized: {}", intent.intent)
}

fn delayed_tasks_response(request: CountRequest, tasks: &[DelayedTask]) -> String {
    match request {
        CountRequest::All => {
            let mut message = "Here are the delayed tasks:\n".to_string();
            push_task_lines(&mut message, tasks);
            message
        }
        CountRequest::Top(count) => {
            let mut message = format!("Here are the top {count} delayed tasks:\n");
            let shown = usize::try_from(count).unwrap_or(0).min(tasks.len());
            push_task_lines(&mut message, &tasks[..shown]);
            message
        }
        CountRequest::Invalid(raw) => {
            format!("Invalid number provided: {raw}. Please provide a valid number.")
        }
    }
}
