// SMS channel adapter
//
// Inbound: the Twilio webhook posts form-encoded From/Body; the message is
// routed to the currently active event, run through the pipeline, and the
// reply is sent back through the Twilio REST API. The webhook always
// acknowledges with the empty TwiML document once the request shape checks
// out; pipeline and send failures never surface to the gateway.
//
// Also hosts the per-event SMS settings and the outbound test endpoint.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use soiree_core::{MessageHandler, Platform};
use soiree_storage::{Database, SmsSettingsRow, UpsertSmsSettings};

use crate::twilio::TwilioClient;

/// Empty TwiML acknowledgment expected by the gateway
const TWIML_EMPTY_RESPONSE: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response></Response>";

const TEST_MESSAGE: &str = "Hello! This is a test message from your AI Event Agent.";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub handler: MessageHandler,
    /// Absent when Twilio credentials are not configured; inbound messages
    /// are still processed but replies are only logged
    pub twilio: Option<Arc<TwilioClient>>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/sms", post(sms_webhook))
        .route("/v1/sms/test", post(send_test_sms))
        .route(
            "/v1/events/{event_id}/sms-settings",
            get(get_sms_settings).put(put_sms_settings),
        )
        .with_state(state)
}

/// Form payload Twilio posts for an inbound message
#[derive(Debug, Clone, Deserialize)]
pub struct SmsWebhookPayload {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// The gateway signs every webhook request; absence means the request did
/// not come from Twilio. The signature itself is not verified.
fn has_twilio_signature(headers: &HeaderMap) -> bool {
    headers.contains_key("x-twilio-signature")
}

fn twiml_ack() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        TWIML_EMPTY_RESPONSE,
    )
        .into_response()
}

/// POST /webhooks/sms - Inbound message webhook
pub async fn sms_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<SmsWebhookPayload>,
) -> Response {
    if !has_twilio_signature(&headers) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let event = match state.db.get_active_event().await {
        Ok(Some(event)) => event,
        Ok(None) => {
            tracing::warn!("inbound SMS with no active event");
            return (StatusCode::NOT_FOUND, "No active event found").into_response();
        }
        Err(e) => {
            tracing::error!("Failed to resolve active event: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    // Organizers can pause the assistant per event
    match state.db.get_sms_settings(event.id).await {
        Ok(Some(settings)) if !settings.auto_reply_enabled => {
            tracing::info!(event_id = %event.id, "auto-reply disabled, ignoring inbound SMS");
            return twiml_ack();
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(event_id = %event.id, "Failed to load SMS settings: {}", e);
        }
    }

    let reply = state
        .handler
        .handle_inbound(event.id, Platform::Sms, &payload.from, &payload.body)
        .await;

    match &state.twilio {
        Some(twilio) => {
            if let Err(e) = twilio.send_message(&payload.from, &reply.response).await {
                tracing::error!(to = %payload.from, "Failed to send SMS reply: {}", e);
            }
        }
        None => {
            tracing::warn!(to = %payload.from, "Twilio not configured, dropping SMS reply");
        }
    }

    twiml_ack()
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendTestSmsRequest {
    /// Destination phone number in E.164 format
    pub to: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SendTestSmsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /v1/sms/test - Send a fixed test message
#[utoipa::path(
    post,
    path = "/v1/sms/test",
    request_body = SendTestSmsRequest,
    responses(
        (status = 200, description = "Test message sent", body = SendTestSmsResponse),
        (status = 500, description = "Send failed", body = SendTestSmsResponse)
    ),
    tag = "sms"
)]
pub async fn send_test_sms(
    State(state): State<AppState>,
    Json(req): Json<SendTestSmsRequest>,
) -> (StatusCode, Json<SendTestSmsResponse>) {
    let Some(twilio) = &state.twilio else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SendTestSmsResponse {
                success: false,
                message_id: None,
                error: Some("Twilio is not configured".to_string()),
            }),
        );
    };

    match twilio.send_message(&req.to, TEST_MESSAGE).await {
        Ok(sid) => (
            StatusCode::OK,
            Json(SendTestSmsResponse {
                success: true,
                message_id: Some(sid),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(to = %req.to, "Failed to send test SMS: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SendTestSmsResponse {
                    success: false,
                    message_id: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Public SMS settings representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SmsSettings {
    pub id: Uuid,
    pub event_id: Uuid,
    pub phone_number: Option<String>,
    pub auto_reply_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SmsSettingsRow> for SmsSettings {
    fn from(row: SmsSettingsRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            phone_number: row.phone_number,
            auto_reply_enabled: row.auto_reply_enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PutSmsSettingsRequest {
    pub phone_number: Option<String>,
    #[serde(default = "default_auto_reply")]
    pub auto_reply_enabled: bool,
}

fn default_auto_reply() -> bool {
    true
}

/// GET /v1/events/{event_id}/sms-settings - Fetch SMS settings
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/sms-settings",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "SMS settings", body = SmsSettings),
        (status = 404, description = "No settings for this event"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sms"
)]
pub async fn get_sms_settings(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<SmsSettings>, StatusCode> {
    let settings = state
        .db
        .get_sms_settings(event_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get SMS settings: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(settings.into()))
}

/// PUT /v1/events/{event_id}/sms-settings - Create or replace SMS settings
#[utoipa::path(
    put,
    path = "/v1/events/{event_id}/sms-settings",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = PutSmsSettingsRequest,
    responses(
        (status = 200, description = "SMS settings saved", body = SmsSettings),
        (status = 500, description = "Internal server error")
    ),
    tag = "sms"
)]
pub async fn put_sms_settings(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<PutSmsSettingsRequest>,
) -> Result<Json<SmsSettings>, StatusCode> {
    let settings = state
        .db
        .upsert_sms_settings(
            event_id,
            UpsertSmsSettings {
                phone_number: req.phone_number,
                auto_reply_enabled: req.auto_reply_enabled,
            },
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to save SMS settings: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(settings.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_presence_is_checked_not_verified() {
        let mut headers = HeaderMap::new();
        assert!(!has_twilio_signature(&headers));

        headers.insert("x-twilio-signature", "anything".parse().unwrap());
        assert!(has_twilio_signature(&headers));
    }

    #[test]
    fn twiml_ack_is_the_empty_response_document() {
        assert!(TWIML_EMPTY_RESPONSE.starts_with("<?xml version=\"1.0\""));
        assert!(TWIML_EMPTY_RESPONSE.ends_with("<Response></Response>"));
    }

    #[test]
    fn webhook_payload_decodes_twilio_form_fields() {
        let payload: SmsWebhookPayload =
            serde_urlencoded::from_str("From=%2B15551234567&Body=is+there+parking").unwrap();
        assert_eq!(payload.from, "+15551234567");
        assert_eq!(payload.body, "is there parking");
    }
}
