// Core traits for pluggable backends
//
// These seams let the message pipeline run against different backends:
// - Postgres implementations in soiree-storage for production
// - In-memory implementations for tests

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::{ChatTurn, EventContext, Platform};
use crate::error::Result;

/// Read-only access to event data for a given event identifier
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the event record merged with its ordered schedules and FAQs.
    ///
    /// Returns `NotFound` when no event matches; storage failures surface
    /// as `Storage`.
    async fn load_event_context(&self, event_id: Uuid) -> Result<EventContext>;
}

/// Conversation history persistence for a chat context
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Up to `limit` most recent messages, oldest first.
    async fn recent_messages(&self, context_id: Uuid, limit: i64) -> Result<Vec<ChatTurn>>;

    /// Append one message to the context's history.
    async fn append_message(&self, context_id: Uuid, content: &str, is_assistant: bool)
        -> Result<()>;

    /// Resolve the context for (platform, chat_id), creating it scoped to
    /// `event_id` when absent. Creation is atomic: concurrent first contacts
    /// for the same pair converge on a single context.
    async fn get_or_create_context(
        &self,
        event_id: Uuid,
        platform: Platform,
        chat_id: &str,
    ) -> Result<Uuid>;
}

/// Records low-confidence questions for human review
#[async_trait]
pub trait EscalationSink: Send + Sync {
    /// Persist the question together with a snapshot of the pre-answer history.
    async fn record_unanswered(
        &self,
        event_id: Uuid,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<()>;
}
