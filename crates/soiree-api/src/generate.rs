// Assistant HTTP routes
//
// Two entry points for the web tester: a raw generation endpoint that sends
// a caller-supplied prompt straight to the model, and a chat endpoint that
// runs the full pipeline against one event with a session-scoped context.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use soiree_core::{AssistantError, LlmClient, MessageHandler, Platform, Reply};

#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmClient>,
    pub handler: MessageHandler,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/generate", post(generate))
        .route("/v1/events/{event_id}/chat", post(chat))
        .with_state(state)
}

/// Placeholder model backend used when no API credential is configured.
/// Every call fails with a configuration error, which the handlers map to 401.
pub struct UnconfiguredLlm;

#[async_trait]
impl LlmClient for UnconfiguredLlm {
    async fn generate(&self, _prompt: &str) -> soiree_core::Result<Reply> {
        Err(AssistantError::config("ANTHROPIC_API_KEY is not set"))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub response: String,
    pub confidence: f64,
}

impl From<Reply> for GenerateResponse {
    fn from(reply: Reply) -> Self {
        Self {
            response: reply.response,
            confidence: reply.confidence,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Guest message to answer
    pub message: String,
    /// Tester session token; one chat context per token
    pub session_id: String,
}

/// Status for a failed generation, mirrored from the assistant error kind
fn error_status(error: &AssistantError) -> StatusCode {
    match error {
        AssistantError::Configuration(_) => StatusCode::UNAUTHORIZED,
        AssistantError::UpstreamFormat(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /v1/generate - Send a raw prompt to the model
#[utoipa::path(
    post,
    path = "/v1/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated answer", body = GenerateResponse),
        (status = 400, description = "Empty prompt"),
        (status = 401, description = "Model credential not configured"),
        (status = 502, description = "Model reply malformed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "assistant"
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<crate::common::ErrorResponse>)> {
    if req.prompt.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(crate::common::ErrorResponse::new("Prompt is required")),
        ));
    }

    let reply = state.llm.generate(&req.prompt).await.map_err(|e| {
        tracing::error!("Generation failed: {}", e);
        (
            error_status(&e),
            Json(crate::common::ErrorResponse::new(e.to_string())),
        )
    })?;

    Ok(Json(reply.into()))
}

/// POST /v1/events/{event_id}/chat - Run the full pipeline as the web tester
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/chat",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply (internal failures degrade to a fixed apology)", body = GenerateResponse)
    ),
    tag = "assistant"
)]
pub async fn chat(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Json<GenerateResponse> {
    let reply = state
        .handler
        .handle_inbound(event_id, Platform::Web, &req.session_id, &req.message)
        .await;

    Json(reply.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use soiree_core::{
        ChatTurn, ConversationStore, EscalationSink, EventContext, EventSource, FALLBACK_REPLY,
    };
    use tower::ServiceExt;

    /// Storage backend where every call fails
    struct DownStore;

    #[async_trait]
    impl EventSource for DownStore {
        async fn load_event_context(&self, _event_id: Uuid) -> soiree_core::Result<EventContext> {
            Err(AssistantError::storage("connection refused"))
        }
    }

    #[async_trait]
    impl ConversationStore for DownStore {
        async fn recent_messages(
            &self,
            _context_id: Uuid,
            _limit: i64,
        ) -> soiree_core::Result<Vec<ChatTurn>> {
            Err(AssistantError::storage("connection refused"))
        }

        async fn append_message(
            &self,
            _context_id: Uuid,
            _content: &str,
            _is_assistant: bool,
        ) -> soiree_core::Result<()> {
            Err(AssistantError::storage("connection refused"))
        }

        async fn get_or_create_context(
            &self,
            _event_id: Uuid,
            _platform: Platform,
            _chat_id: &str,
        ) -> soiree_core::Result<Uuid> {
            Err(AssistantError::storage("connection refused"))
        }
    }

    #[async_trait]
    impl EscalationSink for DownStore {
        async fn record_unanswered(
            &self,
            _event_id: Uuid,
            _question: &str,
            _history: &[ChatTurn],
        ) -> soiree_core::Result<()> {
            Err(AssistantError::storage("connection refused"))
        }
    }

    fn test_app() -> axum::Router {
        let store = Arc::new(DownStore);
        let llm: Arc<dyn LlmClient> = Arc::new(UnconfiguredLlm);
        let handler = MessageHandler::new(store.clone(), store.clone(), store, llm.clone());
        routes(AppState { llm, handler })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_with_400() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"prompt": "  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Prompt is required");
    }

    #[tokio::test]
    async fn generate_without_credential_is_401() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"prompt": "is there parking"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn chat_degrades_to_200_apology_when_storage_is_down() {
        let event_id = Uuid::now_v7();
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/v1/events/{event_id}/chat"))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"message": "hi", "session_id": "session-1"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["response"], FALLBACK_REPLY);
        assert_eq!(body["confidence"], 1.0);
    }

    #[test]
    fn configuration_errors_map_to_unauthorized() {
        let status = error_status(&AssistantError::config("no key"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_format_errors_map_to_bad_gateway() {
        let status = error_status(&AssistantError::upstream("no content"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn other_errors_map_to_internal_server_error() {
        assert_eq!(
            error_status(&AssistantError::network("down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_status(&AssistantError::storage("down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn unconfigured_llm_always_fails_with_configuration() {
        let err = UnconfiguredLlm.generate("hi").await.unwrap_err();
        assert!(matches!(err, AssistantError::Configuration(_)));
    }
}
