// Human-review queue HTTP routes
//
// Low-confidence answers land here as pending questions; a reviewer marks
// them answered or ignored.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use soiree_storage::{Database, UnansweredQuestionRow};

use crate::common::ListResponse;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events/{event_id}/questions", get(list_questions))
        .route("/v1/questions/{question_id}", patch(update_question))
        .with_state(state)
}

/// Review state of an escalated question
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Answered,
    Ignored,
}

impl QuestionStatus {
    fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Answered => "answered",
            QuestionStatus::Ignored => "ignored",
        }
    }
}

/// Public unanswered-question representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnansweredQuestion {
    pub id: Uuid,
    pub event_id: Uuid,
    pub question: String,
    /// History snapshot captured at escalation time
    pub context: Option<serde_json::Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UnansweredQuestionRow> for UnansweredQuestion {
    fn from(row: UnansweredQuestionRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            question: row.question,
            context: row.context,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListQuestionsQuery {
    /// Filter by review status
    pub status: Option<QuestionStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateQuestionRequest {
    pub status: QuestionStatus,
}

/// GET /v1/events/{event_id}/questions - List escalated questions
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/questions",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        ("status" = Option<QuestionStatus>, Query, description = "Filter by review status")
    ),
    responses(
        (status = 200, description = "Escalated questions", body = ListResponse<UnansweredQuestion>),
        (status = 500, description = "Internal server error")
    ),
    tag = "questions"
)]
pub async fn list_questions(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<Json<ListResponse<UnansweredQuestion>>, StatusCode> {
    let questions = state
        .db
        .list_unanswered_questions(event_id, query.status.map(|s| s.as_str()))
        .await
        .map_err(|e| {
            tracing::error!("Failed to list unanswered questions: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ListResponse::new(
        questions.into_iter().map(UnansweredQuestion::from).collect(),
    )))
}

/// PATCH /v1/questions/{question_id} - Set review status
#[utoipa::path(
    patch,
    path = "/v1/questions/{question_id}",
    params(
        ("question_id" = Uuid, Path, description = "Question ID")
    ),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = UnansweredQuestion),
        (status = 404, description = "Question not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "questions"
)]
pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<Json<UnansweredQuestion>, StatusCode> {
    let question = state
        .db
        .update_question_status(question_id, req.status.as_str())
        .await
        .map_err(|e| {
            tracing::error!("Failed to update question status: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(question.into()))
}
