// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Event models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
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

#[derive(Debug, Clone)]
pub struct CreateEvent {
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
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEvent {
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

// ============================================
// Schedule models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub activity_name: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub location_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSchedule {
    pub event_id: Uuid,
    pub activity_name: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub location_detail: Option<String>,
}

// ============================================
// FAQ models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct FaqRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFaq {
    pub event_id: Uuid,
    pub question: String,
    pub answer: String,
}

// ============================================
// Guest models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct GuestRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rsvp_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateGuest {
    pub event_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// ============================================
// Chat models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ChatContextRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub platform: String,
    pub chat_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub context_id: Uuid,
    pub content: String,
    pub is_assistant: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Unanswered question models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UnansweredQuestionRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub question: String,
    pub context: Option<sqlx::types::JsonValue>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUnansweredQuestion {
    pub event_id: Uuid,
    pub question: String,
    pub context: serde_json::Value,
}

// ============================================
// SMS settings models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SmsSettingsRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub phone_number: Option<String>,
    pub auto_reply_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertSmsSettings {
    pub phone_number: Option<String>,
    pub auto_reply_enabled: bool,
}
