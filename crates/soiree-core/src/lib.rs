// Core domain for the Soiree guest assistant
//
// Everything here is backend-agnostic: the message pipeline talks to storage
// and the model through traits, so soiree-storage and soiree-anthropic plug
// in for production and in-memory fakes plug in for tests.

pub mod context;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod traits;

pub use context::{ChatTurn, EventContext, FaqEntry, Platform, ScheduleEntry};
pub use error::{AssistantError, Result};
pub use llm::{clamp_confidence, LlmClient, ModelReply, Reply, DEFAULT_PLAIN_CONFIDENCE};
pub use pipeline::{
    MessageHandler, ESCALATION_THRESHOLD, EVENT_NOT_FOUND_REPLY, FALLBACK_REPLY, HISTORY_LIMIT,
};
pub use prompt::build_prompt;
pub use traits::{ConversationStore, EscalationSink, EventSource};
