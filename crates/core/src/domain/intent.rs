use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel intent for a query that could not be classified.
pub const UNKNOWN_INTENT: &str = "unknown";
pub const GET_DELAYED_TASKS_INTENT: &str = "GetDelayedTasks";

/// Entity key carrying the requested number of tasks.
const NUMBER_ENTITY: &str = "number";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: String,
    #[serde(default)]
    pub entities: Map<String, Value>,
}

/// How the `number` entity of a query resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountRequest {
    /// No usable count was given; list everything.
    All,
    Top(i64),
    /// A count was given but is not an integer. Holds the value as the user
    /// should see it echoed back.
    Invalid(String),
}

impl IntentResult {
    pub fn new(intent: impl Into<String>, entities: Map<String, Value>) -> Self {
        Self { intent: intent.into(), entities }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_INTENT, Map::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.intent == UNKNOWN_INTENT
    }

    pub fn entity(&self, key: &str) -> Option<&Value> {
        self.entities.get(key)
    }

    /// Resolves the `number` entity. Empty-ish values (`null`, `""`, `0`,
    /// `false`, empty arrays or objects) count as absent.
    pub fn count_request(&self) -> CountRequest {
        match self.entity(NUMBER_ENTITY) {
            None => CountRequest::All,
            Some(value) if is_blank(value) => CountRequest::All,
            Some(value) => parse_count(value),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn parse_count(value: &Value) -> CountRequest {
    match value {
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(count) => CountRequest::Top(count),
            Err(_) => CountRequest::Invalid(text.clone()),
        },
        Value::Number(number) => {
            if let Some(count) = number.as_i64() {
                CountRequest::Top(count)
            } else {
                match number.as_f64() {
                    Some(float) if float.is_finite() && float.abs() < i64::MAX as f64 => {
                        CountRequest::Top(float.trunc() as i64)
                    }
                    _ => CountRequest::Invalid(number.to_string()),
                }
            }
        }
        // `false` never gets here; it is blank.
        Value::Bool(_) => CountRequest::Top(1),
        other => CountRequest::Invalid(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use crate::domain::intent::{CountRequest, IntentResult};

    fn with_number(value: Value) -> IntentResult {
        let mut entities = Map::new();
        entities.insert("number".to_string(), value);
        IntentResult::new("GetDelayedTasks", entities)
    }

    #[test]
    fn unknown_sentinel_has_no_entities() {
        let unknown = IntentResult::unknown();
        assert!(unknown.is_unknown());
        assert!(unknown.entities.is_empty());
    }

    #[test]
    fn numeric_strings_and_numbers_resolve_to_top() {
        assert_eq!(with_number(json!("2")).count_request(), CountRequest::Top(2));
        assert_eq!(with_number(json!(" 5 ")).count_request(), CountRequest::Top(5));
        assert_eq!(with_number(json!(3)).count_request(), CountRequest::Top(3));
        assert_eq!(with_number(json!(2.9)).count_request(), CountRequest::Top(2));
        assert_eq!(with_number(json!(-1)).count_request(), CountRequest::Top(-1));
    }

    #[test]
    fn true_counts_as_one() {
        assert_eq!(with_number(json!(true)).count_request(), CountRequest::Top(1));
    }

    #[test]
    fn non_numeric_values_are_invalid_and_echo_raw_text() {
        assert_eq!(
            with_number(json!("abc")).count_request(),
            CountRequest::Invalid("abc".to_string())
        );
        assert_eq!(
            with_number(json!("2.5")).count_request(),
            CountRequest::Invalid("2.5".to_string())
        );
        assert_eq!(
            with_number(json!([1, 2])).count_request(),
            CountRequest::Invalid("[1,2]".to_string())
        );
    }

    #[test]
    fn blank_values_mean_all_tasks() {
        assert_eq!(IntentResult::new("GetDelayedTasks", Map::new()).count_request(), CountRequest::All);
        for blank in [json!(null), json!(""), json!(0), json!(false), json!({})] {
            assert_eq!(with_number(blank).count_request(), CountRequest::All);
        }
    }

    #[test]
    fn missing_entities_deserialize_as_empty() {
        let parsed: IntentResult =
            serde_json::from_str(r#"{"intent": "GetDelayedTasks"}"#).expect("parse intent");
        assert!(parsed.entities.is_empty());
    }
}
