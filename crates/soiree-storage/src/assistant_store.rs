// Database-backed implementations of the core pipeline seams
//
// Maps repository rows into the core domain types and sqlx failures into
// AssistantError::Storage. The pipeline decides which failures are fatal;
// this layer just reports them.

use async_trait::async_trait;
use uuid::Uuid;

use soiree_core::{
    AssistantError, ChatTurn, ConversationStore, EscalationSink, EventContext, EventSource,
    FaqEntry, Platform, Result, ScheduleEntry,
};

use crate::models::CreateUnansweredQuestion;
use crate::repositories::Database;

/// Postgres-backed event loader, conversation store, and escalation sink
#[derive(Clone)]
pub struct DbAssistantStore {
    db: Database,
}

impl DbAssistantStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventSource for DbAssistantStore {
    async fn load_event_context(&self, event_id: Uuid) -> Result<EventContext> {
        let event = self
            .db
            .get_event(event_id)
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?
            .ok_or_else(|| AssistantError::event_not_found(event_id))?;

        let schedules = self
            .db
            .list_schedules(event_id)
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?;

        let faqs = self
            .db
            .list_faqs(event_id)
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?;

        Ok(EventContext {
            id: event.id,
            name: event.name,
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
            location_name: event.location_name,
            location_address: event.location_address,
            location_map_link: event.location_map_link,
            parking_instructions: event.parking_instructions,
            dress_code: event.dress_code,
            gift_registry_link: event.gift_registry_link,
            ai_tone: event.ai_tone,
            response_style: event.response_style,
            schedules: schedules
                .into_iter()
                .map(|row| ScheduleEntry {
                    activity_name: row.activity_name,
                    start_time: row.start_time,
                    end_time: row.end_time,
                    description: row.description,
                    location_detail: row.location_detail,
                })
                .collect(),
            faqs: faqs
                .into_iter()
                .map(|row| FaqEntry {
                    question: row.question,
                    answer: row.answer,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl ConversationStore for DbAssistantStore {
    async fn recent_messages(&self, context_id: Uuid, limit: i64) -> Result<Vec<ChatTurn>> {
        let rows = self
            .db
            .recent_chat_messages(context_id, limit)
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?;

        // Rows come back newest first; the prompt wants oldest first
        Ok(rows
            .into_iter()
            .rev()
            .map(|row| ChatTurn {
                content: row.content,
                is_assistant: row.is_assistant,
            })
            .collect())
    }

    async fn append_message(
        &self,
        context_id: Uuid,
        content: &str,
        is_assistant: bool,
    ) -> Result<()> {
        self.db
            .create_chat_message(context_id, content, is_assistant)
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?;
        Ok(())
    }

    async fn get_or_create_context(
        &self,
        event_id: Uuid,
        platform: Platform,
        chat_id: &str,
    ) -> Result<Uuid> {
        let row = self
            .db
            .upsert_chat_context(event_id, platform.as_str(), chat_id)
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?;
        Ok(row.id)
    }
}

#[async_trait]
impl EscalationSink for DbAssistantStore {
    async fn record_unanswered(
        &self,
        event_id: Uuid,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<()> {
        let context = serde_json::to_value(history)
            .map_err(|e| AssistantError::storage(format!("unserializable history: {e}")))?;

        self.db
            .create_unanswered_question(CreateUnansweredQuestion {
                event_id,
                question: question.to_string(),
                context,
            })
            .await
            .map_err(|e| AssistantError::storage(e.to_string()))?;
        Ok(())
    }
}
