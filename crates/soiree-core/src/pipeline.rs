// Message-handling pipeline
//
// Composes the event loader, conversation store, prompt assembler, model
// client, and escalation sink into one terminal flow per inbound message.
// History and escalation writes are best-effort: their failures are logged
// and the guest still gets a reply. Model failures degrade to a fixed
// apology, never to an error surfaced over the channel.

use std::sync::Arc;

use uuid::Uuid;

use crate::context::Platform;
use crate::error::AssistantError;
use crate::llm::{LlmClient, Reply};
use crate::prompt::build_prompt;
use crate::traits::{ConversationStore, EscalationSink, EventSource};

/// How many past messages are loaded into the prompt
pub const HISTORY_LIMIT: i64 = 5;

/// Answers below this confidence are filed for human review
pub const ESCALATION_THRESHOLD: f64 = 0.7;

/// Reply when the event id resolves to nothing
pub const EVENT_NOT_FOUND_REPLY: &str =
    "I'm sorry, I couldn't find information about this event.";

/// Reply when the model call or some earlier stage fails
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error processing your message. Please try again later.";

/// The conversational pipeline over injected backends.
///
/// Clients are constructed once at process start and shared; the handler
/// itself is cheap to clone.
#[derive(Clone)]
pub struct MessageHandler {
    events: Arc<dyn EventSource>,
    conversations: Arc<dyn ConversationStore>,
    escalations: Arc<dyn EscalationSink>,
    llm: Arc<dyn LlmClient>,
}

impl MessageHandler {
    pub fn new(
        events: Arc<dyn EventSource>,
        conversations: Arc<dyn ConversationStore>,
        escalations: Arc<dyn EscalationSink>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            events,
            conversations,
            escalations,
            llm,
        }
    }

    /// Resolve the chat context for (platform, chat_id) and handle the message.
    ///
    /// Never fails: context-resolution errors degrade to the fixed apology so
    /// the channel adapter always has something to relay.
    pub async fn handle_inbound(
        &self,
        event_id: Uuid,
        platform: Platform,
        chat_id: &str,
        message: &str,
    ) -> Reply {
        let context_id = match self
            .conversations
            .get_or_create_context(event_id, platform, chat_id)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(%event_id, %platform, error = %e, "failed to resolve chat context");
                return Reply {
                    response: FALLBACK_REPLY.to_string(),
                    confidence: 1.0,
                };
            }
        };

        self.handle(event_id, message, context_id, platform).await
    }

    /// Handle one inbound message for an already-resolved chat context.
    ///
    /// A confidence of 1.0 on the fixed replies is a sentinel meaning "no
    /// further action needed" and never triggers escalation.
    pub async fn handle(
        &self,
        event_id: Uuid,
        message: &str,
        context_id: Uuid,
        platform: Platform,
    ) -> Reply {
        tracing::info!(%event_id, %context_id, %platform, "handling inbound message");

        let event = match self.events.load_event_context(event_id).await {
            Ok(event) => event,
            Err(AssistantError::NotFound(_)) => {
                tracing::warn!(%event_id, "inbound message for unknown event");
                return Reply {
                    response: EVENT_NOT_FOUND_REPLY.to_string(),
                    confidence: 1.0,
                };
            }
            Err(e) => {
                tracing::error!(%event_id, error = %e, "failed to load event context");
                return Reply {
                    response: FALLBACK_REPLY.to_string(),
                    confidence: 1.0,
                };
            }
        };

        // History read failure is non-fatal: answer from event data alone
        let history = match self
            .conversations
            .recent_messages(context_id, HISTORY_LIMIT)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(%context_id, error = %e, "failed to load history, continuing without");
                Vec::new()
            }
        };

        let prompt = build_prompt(message, &event, &history);

        match self.llm.generate(&prompt).await {
            Ok(reply) => {
                self.persist_exchange(context_id, message, &reply.response)
                    .await;

                if reply.confidence < ESCALATION_THRESHOLD {
                    if let Err(e) = self
                        .escalations
                        .record_unanswered(event_id, message, &history)
                        .await
                    {
                        tracing::warn!(%event_id, error = %e, "failed to record unanswered question");
                    }
                }

                reply
            }
            Err(e) => {
                tracing::error!(%event_id, %context_id, error = %e, "model call failed");
                self.persist_exchange(context_id, message, FALLBACK_REPLY)
                    .await;
                Reply {
                    response: FALLBACK_REPLY.to_string(),
                    confidence: 1.0,
                }
            }
        }
    }

    /// Persist both sides of the exchange concurrently, best-effort.
    async fn persist_exchange(&self, context_id: Uuid, user: &str, assistant: &str) {
        let (stored_user, stored_assistant) = tokio::join!(
            self.conversations.append_message(context_id, user, false),
            self.conversations.append_message(context_id, assistant, true),
        );
        if let Err(e) = stored_user {
            tracing::warn!(%context_id, error = %e, "failed to store user message");
        }
        if let Err(e) = stored_assistant {
            tracing::warn!(%context_id, error = %e, "failed to store assistant message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ChatTurn, EventContext, FaqEntry};
    use crate::error::Result;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn smith_wedding(id: Uuid) -> EventContext {
        EventContext {
            id,
            name: "Smith Wedding".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: None,
            location_name: "Willow Barn".to_string(),
            location_address: "12 Orchard Lane".to_string(),
            location_map_link: None,
            parking_instructions: None,
            dress_code: None,
            gift_registry_link: None,
            ai_tone: "friendly".to_string(),
            response_style: "concise".to_string(),
            schedules: vec![],
            faqs: vec![FaqEntry {
                question: "Is there parking?".to_string(),
                answer: "Yes, free lot B".to_string(),
            }],
        }
    }

    struct FakeEvents {
        event: Option<EventContext>,
    }

    #[async_trait]
    impl EventSource for FakeEvents {
        async fn load_event_context(&self, event_id: Uuid) -> Result<EventContext> {
            self.event
                .clone()
                .ok_or_else(|| AssistantError::event_not_found(event_id))
        }
    }

    #[derive(Default)]
    struct FakeConversations {
        history: Mutex<Vec<ChatTurn>>,
        fail_reads: bool,
        contexts: Mutex<Vec<(Uuid, String, String)>>,
    }

    #[async_trait]
    impl ConversationStore for FakeConversations {
        async fn recent_messages(&self, _context_id: Uuid, limit: i64) -> Result<Vec<ChatTurn>> {
            if self.fail_reads {
                return Err(AssistantError::storage("read failed"));
            }
            let history = self.history.lock().unwrap();
            let skip = history.len().saturating_sub(limit as usize);
            Ok(history.iter().skip(skip).cloned().collect())
        }

        async fn append_message(
            &self,
            _context_id: Uuid,
            content: &str,
            is_assistant: bool,
        ) -> Result<()> {
            self.history.lock().unwrap().push(ChatTurn {
                content: content.to_string(),
                is_assistant,
            });
            Ok(())
        }

        async fn get_or_create_context(
            &self,
            event_id: Uuid,
            platform: Platform,
            chat_id: &str,
        ) -> Result<Uuid> {
            let mut contexts = self.contexts.lock().unwrap();
            let key = (event_id, platform.to_string(), chat_id.to_string());
            if let Some(pos) = contexts.iter().position(|c| *c == key) {
                return Ok(Uuid::from_u128(pos as u128 + 1));
            }
            contexts.push(key);
            Ok(Uuid::from_u128(contexts.len() as u128))
        }
    }

    #[derive(Default)]
    struct FakeEscalations {
        recorded: Mutex<Vec<(Uuid, String, Vec<ChatTurn>)>>,
    }

    #[async_trait]
    impl EscalationSink for FakeEscalations {
        async fn record_unanswered(
            &self,
            event_id: Uuid,
            question: &str,
            history: &[ChatTurn],
        ) -> Result<()> {
            self.recorded.lock().unwrap().push((
                event_id,
                question.to_string(),
                history.to_vec(),
            ));
            Ok(())
        }
    }

    struct FakeLlm {
        reply: Result<Reply>,
        calls: AtomicUsize,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl FakeLlm {
        fn replying(response: &str, confidence: f64) -> Self {
            Self {
                reply: Ok(Reply {
                    response: response.to_string(),
                    confidence,
                }),
                calls: AtomicUsize::new(0),
                seen_prompts: Mutex::new(vec![]),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(AssistantError::network("connection refused")),
                calls: AtomicUsize::new(0),
                seen_prompts: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn generate(&self, prompt: &str) -> Result<Reply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(_) => Err(AssistantError::network("connection refused")),
            }
        }
    }

    struct Fixture {
        handler: MessageHandler,
        conversations: Arc<FakeConversations>,
        escalations: Arc<FakeEscalations>,
        llm: Arc<FakeLlm>,
        event_id: Uuid,
    }

    fn fixture(event_present: bool, llm: FakeLlm) -> Fixture {
        fixture_with(event_present, llm, FakeConversations::default())
    }

    fn fixture_with(event_present: bool, llm: FakeLlm, conversations: FakeConversations) -> Fixture {
        let event_id = Uuid::now_v7();
        let events = Arc::new(FakeEvents {
            event: event_present.then(|| smith_wedding(event_id)),
        });
        let conversations = Arc::new(conversations);
        let escalations = Arc::new(FakeEscalations::default());
        let llm = Arc::new(llm);
        let handler = MessageHandler::new(
            events,
            conversations.clone(),
            escalations.clone(),
            llm.clone(),
        );
        Fixture {
            handler,
            conversations,
            escalations,
            llm,
            event_id,
        }
    }

    #[tokio::test]
    async fn answers_and_persists_both_sides() {
        let fx = fixture(true, FakeLlm::replying("Yes, free lot B", 0.9));
        let reply = fx
            .handler
            .handle(fx.event_id, "is there parking", Uuid::now_v7(), Platform::Sms)
            .await;

        assert_eq!(reply.response, "Yes, free lot B");
        assert_eq!(reply.confidence, 0.9);

        let history = fx.conversations.history.lock().unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_assistant);
        assert_eq!(history[0].content, "is there parking");
        assert!(history[1].is_assistant);

        // 0.9 is confident enough: no review item
        assert!(fx.escalations.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn prompt_embeds_event_faq() {
        let fx = fixture(true, FakeLlm::replying("Yes, free lot B", 0.9));
        fx.handler
            .handle(fx.event_id, "is there parking", Uuid::now_v7(), Platform::Web)
            .await;

        let prompts = fx.llm.seen_prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Yes, free lot B"));
        assert!(prompts[0].contains("Smith Wedding"));
    }

    #[tokio::test]
    async fn low_confidence_escalates_with_question_text() {
        let fx = fixture(true, FakeLlm::replying("maybe?", 0.4));
        fx.handler
            .handle(fx.event_id, "can I bring my dog", Uuid::now_v7(), Platform::Sms)
            .await;

        let recorded = fx.escalations.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, fx.event_id);
        assert_eq!(recorded[0].1, "can I bring my dog");
    }

    #[tokio::test]
    async fn exactly_threshold_does_not_escalate() {
        let fx = fixture(true, FakeLlm::replying("probably", 0.7));
        fx.handler
            .handle(fx.event_id, "question", Uuid::now_v7(), Platform::Sms)
            .await;

        assert!(fx.escalations.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn escalation_snapshot_is_pre_answer_history() {
        let conversations = FakeConversations::default();
        conversations
            .history
            .lock()
            .unwrap()
            .push(ChatTurn::user("earlier question"));
        let fx = fixture_with(true, FakeLlm::replying("unsure", 0.2), conversations);

        fx.handler
            .handle(fx.event_id, "new question", Uuid::now_v7(), Platform::Sms)
            .await;

        let recorded = fx.escalations.recorded.lock().unwrap();
        assert_eq!(recorded[0].2.len(), 1);
        assert_eq!(recorded[0].2[0].content, "earlier question");
    }

    #[tokio::test]
    async fn unknown_event_returns_fixed_reply_without_model_call() {
        let fx = fixture(false, FakeLlm::replying("unused", 0.9));
        let reply = fx
            .handler
            .handle(Uuid::now_v7(), "hello", Uuid::now_v7(), Platform::Sms)
            .await;

        assert_eq!(reply.response, EVENT_NOT_FOUND_REPLY);
        assert_eq!(reply.confidence, 1.0);
        assert_eq!(fx.llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn model_failure_degrades_to_apology_and_persists_it() {
        let fx = fixture(true, FakeLlm::failing());
        let reply = fx
            .handler
            .handle(fx.event_id, "hello", Uuid::now_v7(), Platform::Sms)
            .await;

        assert_eq!(reply.response, FALLBACK_REPLY);
        assert_eq!(reply.confidence, 1.0);

        let history = fx.conversations.history.lock().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn history_read_failure_is_non_fatal() {
        let conversations = FakeConversations {
            fail_reads: true,
            ..FakeConversations::default()
        };
        let fx = fixture_with(true, FakeLlm::replying("answer", 0.9), conversations);

        let reply = fx
            .handler
            .handle(fx.event_id, "hello", Uuid::now_v7(), Platform::Sms)
            .await;
        assert_eq!(reply.response, "answer");
    }

    #[tokio::test]
    async fn history_is_capped_and_oldest_first() {
        let conversations = FakeConversations::default();
        {
            let mut history = conversations.history.lock().unwrap();
            for i in 0..3 {
                history.push(ChatTurn::user(format!("msg {i}")));
            }
        }
        let fx = fixture_with(true, FakeLlm::replying("ok", 0.9), conversations);

        let turns = fx
            .conversations
            .recent_messages(Uuid::now_v7(), HISTORY_LIMIT)
            .await
            .unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "msg 0");
        assert_eq!(turns[2].content, "msg 2");
    }

    #[tokio::test]
    async fn get_or_create_context_is_idempotent() {
        let fx = fixture(true, FakeLlm::replying("ok", 0.9));
        let first = fx
            .conversations
            .get_or_create_context(fx.event_id, Platform::Sms, "+15551234567")
            .await
            .unwrap();
        let second = fx
            .conversations
            .get_or_create_context(fx.event_id, Platform::Sms, "+15551234567")
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn handle_inbound_resolves_context_then_answers() {
        let fx = fixture(true, FakeLlm::replying("welcome!", 0.95));
        let reply = fx
            .handler
            .handle_inbound(fx.event_id, Platform::Sms, "+15551234567", "hi")
            .await;

        assert_eq!(reply.response, "welcome!");
        assert_eq!(fx.conversations.contexts.lock().unwrap().len(), 1);
    }
}
