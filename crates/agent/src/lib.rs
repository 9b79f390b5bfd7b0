//! Agent runtime: intent extraction and the run orchestrator.
//!
//! - **LLM** (`llm`) - `LlmClient` trait and the OpenRouter chat-completions client
//! - **Intent** (`intent`) - prompt construction and fenced-JSON reply parsing
//! - **Messages** (`messages`) - notification text
//! - **Runtime** (`runtime`) - `ScrumBoardAgent`, one linear run per call
//!
//! The model only classifies the query. Which tasks are reported, and how,
//! is decided here from the work-item data.

pub mod intent;
pub mod llm;
pub mod messages;
pub mod runtime;

pub use intent::{IntentClassifier, IntentError, IntentExtractor};
pub use llm::{LlmClient, LlmError, OpenRouterClient};
pub use runtime::{RunReport, ScrumBoardAgent};
