// FAQ HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use soiree_storage::{CreateFaq, Database, FaqRow};

use crate::common::ListResponse;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events/{event_id}/faqs", post(create_faq).get(list_faqs))
        .route("/v1/faqs/{faq_id}", delete(delete_faq))
        .with_state(state)
}

/// Public FAQ representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Faq {
    pub id: Uuid,
    pub event_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<FaqRow> for Faq {
    fn from(row: FaqRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            question: row.question,
            answer: row.answer,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
}

/// POST /v1/events/{event_id}/faqs - Add an FAQ entry
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/faqs",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = CreateFaqRequest,
    responses(
        (status = 201, description = "FAQ created", body = Faq),
        (status = 500, description = "Internal server error")
    ),
    tag = "faqs"
)]
pub async fn create_faq(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateFaqRequest>,
) -> Result<(StatusCode, Json<Faq>), StatusCode> {
    let input = CreateFaq {
        event_id,
        question: req.question,
        answer: req.answer,
    };

    let faq = state.db.create_faq(input).await.map_err(|e| {
        tracing::error!("Failed to create FAQ: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(faq.into())))
}

/// GET /v1/events/{event_id}/faqs - List FAQs in creation order
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/faqs",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "FAQ entries", body = ListResponse<Faq>),
        (status = 500, description = "Internal server error")
    ),
    tag = "faqs"
)]
pub async fn list_faqs(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ListResponse<Faq>>, StatusCode> {
    let faqs = state.db.list_faqs(event_id).await.map_err(|e| {
        tracing::error!("Failed to list FAQs: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(
        faqs.into_iter().map(Faq::from).collect(),
    )))
}

/// DELETE /v1/faqs/{faq_id} - Remove an FAQ entry
#[utoipa::path(
    delete,
    path = "/v1/faqs/{faq_id}",
    params(
        ("faq_id" = Uuid, Path, description = "FAQ ID")
    ),
    responses(
        (status = 204, description = "FAQ deleted"),
        (status = 404, description = "FAQ not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "faqs"
)]
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state.db.delete_faq(faq_id).await.map_err(|e| {
        tracing::error!("Failed to delete FAQ: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
