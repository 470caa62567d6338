// Event CRUD HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use soiree_storage::{CreateEvent, Database, EventRow, UpdateEvent};

use crate::common::ListResponse;

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

/// Create event routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events", post(create_event).get(list_events))
        .route(
            "/v1/events/{event_id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .with_state(state)
}

/// Public event representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location_name: String,
    pub location_address: String,
    pub location_map_link: Option<String>,
    pub parking_instructions: Option<String>,
    pub dress_code: Option<String>,
    pub gift_registry_link: Option<String>,
    pub ai_tone: String,
    pub response_style: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            location_name: row.location_name,
            location_address: row.location_address,
            location_map_link: row.location_map_link,
            parking_instructions: row.parking_instructions,
            dress_code: row.dress_code,
            gift_registry_link: row.gift_registry_link,
            ai_tone: row.ai_tone,
            response_style: row.response_style,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location_name: String,
    pub location_address: String,
    pub location_map_link: Option<String>,
    pub parking_instructions: Option<String>,
    pub dress_code: Option<String>,
    pub gift_registry_link: Option<String>,
    pub ai_tone: Option<String>,
    pub response_style: Option<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub location_map_link: Option<String>,
    pub parking_instructions: Option<String>,
    pub dress_code: Option<String>,
    pub gift_registry_link: Option<String>,
    pub ai_tone: Option<String>,
    pub response_style: Option<String>,
    pub active: Option<bool>,
}

/// POST /v1/events - Create a new event
#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created successfully", body = Event),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), StatusCode> {
    let input = CreateEvent {
        name: req.name,
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        location_name: req.location_name,
        location_address: req.location_address,
        location_map_link: req.location_map_link,
        parking_instructions: req.parking_instructions,
        dress_code: req.dress_code,
        gift_registry_link: req.gift_registry_link,
        ai_tone: req.ai_tone,
        response_style: req.response_style,
        active: req.active,
    };

    let event = state.db.create_event(input).await.map_err(|e| {
        tracing::error!("Failed to create event: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(event.into())))
}

/// GET /v1/events - List all events, newest first
#[utoipa::path(
    get,
    path = "/v1/events",
    responses(
        (status = 200, description = "List of events", body = ListResponse<Event>),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Event>>, StatusCode> {
    let events = state.db.list_events().await.map_err(|e| {
        tracing::error!("Failed to list events: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(
        events.into_iter().map(Event::from).collect(),
    )))
}

/// GET /v1/events/{event_id} - Get event by ID
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, StatusCode> {
    let event = state
        .db
        .get_event(event_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get event: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(event.into()))
}

/// PATCH /v1/events/{event_id} - Update event
#[utoipa::path(
    patch,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated successfully", body = Event),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, StatusCode> {
    let input = UpdateEvent {
        name: req.name,
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        location_name: req.location_name,
        location_address: req.location_address,
        location_map_link: req.location_map_link,
        parking_instructions: req.parking_instructions,
        dress_code: req.dress_code,
        gift_registry_link: req.gift_registry_link,
        ai_tone: req.ai_tone,
        response_style: req.response_style,
        active: req.active,
    };

    let event = state
        .db
        .update_event(event_id, input)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update event: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(event.into()))
}

/// DELETE /v1/events/{event_id} - Delete event
#[utoipa::path(
    delete,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted successfully"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state.db.delete_event(event_id).await.map_err(|e| {
        tracing::error!("Failed to delete event: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
