// Soiree API server
// Decision: single binary hosting the dashboard CRUD surface, the assistant
// endpoints, and the inbound SMS webhook

mod common;
mod events;
mod faqs;
mod generate;
mod guests;
mod questions;
mod schedules;
mod sms;
mod twilio;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use soiree_anthropic::AnthropicClient;
use soiree_core::{LlmClient, MessageHandler};
use soiree_storage::{Database, DbAssistantStore};

use crate::common::{ErrorResponse, ListResponse};
use crate::twilio::TwilioClient;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    llm_configured: bool,
    sms_enabled: bool,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    llm_configured: bool,
    sms_enabled: bool,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm_configured: state.llm_configured,
        sms_enabled: state.sms_enabled,
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        events::create_event,
        events::list_events,
        events::get_event,
        events::update_event,
        events::delete_event,
        schedules::create_schedule,
        schedules::list_schedules,
        schedules::delete_schedule,
        faqs::create_faq,
        faqs::list_faqs,
        faqs::delete_faq,
        guests::create_guest,
        guests::list_guests,
        guests::update_rsvp,
        guests::delete_guest,
        questions::list_questions,
        questions::update_question,
        generate::generate,
        generate::chat,
        sms::send_test_sms,
        sms::get_sms_settings,
        sms::put_sms_settings,
    ),
    components(
        schemas(
            events::Event,
            events::CreateEventRequest,
            events::UpdateEventRequest,
            schedules::Schedule,
            schedules::CreateScheduleRequest,
            faqs::Faq,
            faqs::CreateFaqRequest,
            guests::Guest,
            guests::RsvpStatus,
            guests::CreateGuestRequest,
            guests::UpdateGuestRequest,
            questions::UnansweredQuestion,
            questions::QuestionStatus,
            questions::UpdateQuestionRequest,
            generate::GenerateRequest,
            generate::GenerateResponse,
            generate::ChatRequest,
            sms::SendTestSmsRequest,
            sms::SendTestSmsResponse,
            sms::SmsSettings,
            sms::PutSmsSettingsRequest,
            ListResponse<events::Event>,
            ListResponse<schedules::Schedule>,
            ListResponse<faqs::Faq>,
            ListResponse<guests::Guest>,
            ListResponse<questions::UnansweredQuestion>,
            ErrorResponse,
        )
    ),
    tags(
        (name = "events", description = "Event management endpoints"),
        (name = "schedules", description = "Schedule management endpoints"),
        (name = "faqs", description = "FAQ management endpoints"),
        (name = "guests", description = "Guest list endpoints"),
        (name = "questions", description = "Escalated question review endpoints"),
        (name = "assistant", description = "AI assistant endpoints"),
        (name = "sms", description = "SMS channel endpoints"),
    ),
    info(
        title = "Soiree API",
        description = "Event dashboard backend with an AI guest assistant",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soiree_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("soiree-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database");

    let db = Arc::new(db);

    // Model backend (optional - gracefully degrade if not configured)
    let (llm, llm_configured): (Arc<dyn LlmClient>, bool) = match AnthropicClient::from_env() {
        Ok(client) => {
            tracing::info!(model = %client.model(), "Anthropic client initialized");
            (Arc::new(client), true)
        }
        Err(e) => {
            tracing::warn!("Anthropic not configured: {}. Assistant replies disabled.", e);
            (Arc::new(generate::UnconfiguredLlm), false)
        }
    };

    // Outbound SMS (optional - inbound still processed without it)
    let twilio = match TwilioClient::from_env() {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!("Twilio not configured: {}. Outbound SMS disabled.", e);
            None
        }
    };

    // Wire the pipeline against the database-backed stores
    let store = Arc::new(DbAssistantStore::new(db.as_ref().clone()));
    let handler = MessageHandler::new(store.clone(), store.clone(), store, llm.clone());

    // Create module-specific states
    let events_state = events::AppState { db: db.clone() };
    let schedules_state = schedules::AppState { db: db.clone() };
    let faqs_state = faqs::AppState { db: db.clone() };
    let guests_state = guests::AppState { db: db.clone() };
    let questions_state = questions::AppState { db: db.clone() };
    let generate_state = generate::AppState {
        llm: llm.clone(),
        handler: handler.clone(),
    };
    let sms_state = sms::AppState {
        db: db.clone(),
        handler,
        twilio: twilio.clone(),
    };
    let health_state = HealthState {
        llm_configured,
        sms_enabled: twilio.is_some(),
    };

    // Load CORS allowed origins from environment (optional)
    // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build main router
    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(events::routes(events_state))
        .merge(schedules::routes(schedules_state))
        .merge(faqs::routes(faqs_state))
        .merge(guests::routes(guests_state))
        .merge(questions::routes(questions_state))
        .merge(generate::routes(generate_state))
        .merge(sms::routes(sms_state));

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::CACHE_CONTROL,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
