use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error};

use scrumwatch_core::{Classified, FailureClass, IntentResult, UNKNOWN_INTENT};

use crate::llm::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum IntentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("no fenced JSON block found in model reply")]
    MissingJsonBlock,
    #[error("malformed intent JSON: {0}")]
    MalformedJson(String),
}

impl Classified for IntentError {
    fn class(&self) -> FailureClass {
        match self {
            Self::Llm(inner) => inner.class(),
            Self::MissingJsonBlock | Self::MalformedJson(_) => FailureClass::Decode,
        }
    }
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn extract(&self, query: &str) -> Result<IntentResult, IntentError>;

    /// Degrading form of [`IntentClassifier::extract`]: any failure is logged
    /// once and reported as the `unknown` intent with no entities.
    async fn get_intent_and_entities(&self, query: &str) -> IntentResult {
        match self.extract(query).await {
            Ok(result) => result,
            Err(err) => {
                error!(
                    event_name = "intent.extraction_failed",
                    error_class = %err.class(),
                    error_transient = err.class().is_transient(),
                    error = %err,
                    "error extracting intent from query"
                );
                IntentResult::unknown()
            }
        }
    }
}

/// Asks a language model to classify a query and parses the fenced JSON block
/// out of its reply.
pub struct IntentExtractor<L> {
    llm: L,
}

impl<L> IntentExtractor<L>
where
    L: LlmClient,
{
    pub fn new(llm: L) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl<L> IntentClassifier for IntentExtractor<L>
where
    L: LlmClient,
{
    async fn extract(&self, query: &str) -> Result<IntentResult, IntentError> {
        let reply = self.llm.complete(&build_prompt(query)).await?;
        let result = parse_reply(&reply)?;
        debug!(
            event_name = "intent.extracted",
            intent = %result.intent,
            entity_count = result.entities.len(),
            "intent extracted"
        );
        Ok(result)
    }
}

pub fn build_prompt(query: &str) -> String {
    format!(
        "Extract the intent and entities from the following query: \"{query}\"\n\n\
         Format your response as a JSON object with \"intent\" and \"entities\" keys, \
         placed inside a ```json code block.\n\
         If no entities are found, return an empty object for the entities.\n"
    )
}

fn json_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?si)```json[ \t]*\r?\n(.*?)\s*```").expect("json block pattern is valid")
    })
}

/// Returns the body of the first ```` ```json ```` block in `reply`.
pub fn extract_json_block(reply: &str) -> Option<&str> {
    json_block_pattern().captures(reply).and_then(|captures| captures.get(1)).map(|m| m.as_str())
}

/// Parses a model reply into an intent. A missing `intent` becomes `unknown`
/// and missing or `null` entities become an empty map.
pub fn parse_reply(reply: &str) -> Result<IntentResult, IntentError> {
    let block = extract_json_block(reply).ok_or(IntentError::MissingJsonBlock)?;
    let value: Value =
        serde_json::from_str(block).map_err(|err| IntentError::MalformedJson(err.to_string()))?;

    let Value::Object(mut fields) = value else {
        return Err(IntentError::MalformedJson("expected a JSON object".to_string()));
    };

    let intent = match fields.remove("intent") {
        None | Some(Value::Null) => UNKNOWN_INTENT.to_string(),
        Some(Value::String(intent)) => intent,
        Some(other) => {
            return Err(IntentError::MalformedJson(format!("intent must be a string, got {other}")))
        }
    };

    let entities = match fields.remove("entities") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(entities)) => entities,
        Some(other) => {
            return Err(IntentError::MalformedJson(format!(
                "entities must be an object, got {other}"
            )))
        }
    };

    Ok(IntentResult::new(intent, entities))
}
