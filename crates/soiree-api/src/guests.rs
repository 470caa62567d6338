// Guest list HTTP routes

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

use soiree_storage::{CreateGuest, Database, GuestRow};

use crate::common::ListResponse;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/events/{event_id}/guests",
            post(create_guest).get(list_guests),
        )
        .route(
            "/v1/guests/{guest_id}",
            delete(delete_guest).patch(update_rsvp),
        )
        .with_state(state)
}

/// RSVP state for a guest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Pending,
    Attending,
    Declined,
}

impl RsvpStatus {
    fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Attending => "attending",
            RsvpStatus::Declined => "declined",
        }
    }
}

/// Public guest representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rsvp_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            rsvp_status: row.rsvp_status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateGuestRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateGuestRequest {
    pub rsvp_status: RsvpStatus,
}

/// POST /v1/events/{event_id}/guests - Add a guest
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/guests",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = CreateGuestRequest,
    responses(
        (status = 201, description = "Guest created", body = Guest),
        (status = 500, description = "Internal server error")
    ),
    tag = "guests"
)]
pub async fn create_guest(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<Guest>), StatusCode> {
    let input = CreateGuest {
        event_id,
        name: req.name,
        phone: req.phone,
        email: req.email,
    };

    let guest = state.db.create_guest(input).await.map_err(|e| {
        tracing::error!("Failed to create guest: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(guest.into())))
}

/// GET /v1/events/{event_id}/guests - List guests
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/guests",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Guest list", body = ListResponse<Guest>),
        (status = 500, description = "Internal server error")
    ),
    tag = "guests"
)]
pub async fn list_guests(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ListResponse<Guest>>, StatusCode> {
    let guests = state.db.list_guests(event_id).await.map_err(|e| {
        tracing::error!("Failed to list guests: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(
        guests.into_iter().map(Guest::from).collect(),
    )))
}

/// PATCH /v1/guests/{guest_id} - Update RSVP status
#[utoipa::path(
    patch,
    path = "/v1/guests/{guest_id}",
    params(
        ("guest_id" = Uuid, Path, description = "Guest ID")
    ),
    request_body = UpdateGuestRequest,
    responses(
        (status = 200, description = "Guest updated", body = Guest),
        (status = 404, description = "Guest not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "guests"
)]
pub async fn update_rsvp(
    State(state): State<AppState>,
    Path(guest_id): Path<Uuid>,
    Json(req): Json<UpdateGuestRequest>,
) -> Result<Json<Guest>, StatusCode> {
    let guest = state
        .db
        .update_guest_rsvp(guest_id, req.rsvp_status.as_str())
        .await
        .map_err(|e| {
            tracing::error!("Failed to update guest: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(guest.into()))
}

/// DELETE /v1/guests/{guest_id} - Remove a guest
#[utoipa::path(
    delete,
    path = "/v1/guests/{guest_id}",
    params(
        ("guest_id" = Uuid, Path, description = "Guest ID")
    ),
    responses(
        (status = 204, description = "Guest deleted"),
        (status = 404, description = "Guest not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "guests"
)]
pub async fn delete_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state.db.delete_guest(guest_id).await.map_err(|e| {
        tracing::error!("Failed to delete guest: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
