// Schedule entry HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use soiree_storage::{CreateSchedule, Database, ScheduleRow};

use crate::common::ListResponse;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/events/{event_id}/schedules",
            post(create_schedule).get(list_schedules),
        )
        .route("/v1/schedules/{schedule_id}", delete(delete_schedule))
        .with_state(state)
}

/// Public schedule entry representation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Schedule {
    pub id: Uuid,
    pub event_id: Uuid,
    pub activity_name: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub location_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            activity_name: row.activity_name,
            start_time: row.start_time,
            end_time: row.end_time,
            description: row.description,
            location_detail: row.location_detail,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateScheduleRequest {
    pub activity_name: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub location_detail: Option<String>,
}

/// POST /v1/events/{event_id}/schedules - Add a schedule entry
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/schedules",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule entry created", body = Schedule),
        (status = 500, description = "Internal server error")
    ),
    tag = "schedules"
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>), StatusCode> {
    let input = CreateSchedule {
        event_id,
        activity_name: req.activity_name,
        start_time: req.start_time,
        end_time: req.end_time,
        description: req.description,
        location_detail: req.location_detail,
    };

    let schedule = state.db.create_schedule(input).await.map_err(|e| {
        tracing::error!("Failed to create schedule entry: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(schedule.into())))
}

/// GET /v1/events/{event_id}/schedules - List schedule entries by start time
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/schedules",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Ordered schedule entries", body = ListResponse<Schedule>),
        (status = 500, description = "Internal server error")
    ),
    tag = "schedules"
)]
pub async fn list_schedules(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ListResponse<Schedule>>, StatusCode> {
    let schedules = state.db.list_schedules(event_id).await.map_err(|e| {
        tracing::error!("Failed to list schedule entries: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(
        schedules.into_iter().map(Schedule::from).collect(),
    )))
}

/// DELETE /v1/schedules/{schedule_id} - Remove a schedule entry
#[utoipa::path(
    delete,
    path = "/v1/schedules/{schedule_id}",
    params(
        ("schedule_id" = Uuid, Path, description = "Schedule entry ID")
    ),
    responses(
        (status = 204, description = "Schedule entry deleted"),
        (status = 404, description = "Schedule entry not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "schedules"
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state.db.delete_schedule(schedule_id).await.map_err(|e| {
        tracing::error!("Failed to delete schedule entry: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
