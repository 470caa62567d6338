// Repository layer for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEvent) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (name, date, start_time, end_time, location_name, location_address,
                                location_map_link, parking_instructions, dress_code, gift_registry_link,
                                ai_tone, response_style, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    COALESCE($11, 'friendly'), COALESCE($12, 'concise'), $13)
            RETURNING id, name, date, start_time, end_time, location_name, location_address,
                      location_map_link, parking_instructions, dress_code, gift_registry_link,
                      ai_tone, response_style, active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location_name)
        .bind(&input.location_address)
        .bind(&input.location_map_link)
        .bind(&input.parking_instructions)
        .bind(&input.dress_code)
        .bind(&input.gift_registry_link)
        .bind(&input.ai_tone)
        .bind(&input.response_style)
        .bind(input.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, date, start_time, end_time, location_name, location_address,
                   location_map_link, parking_instructions, dress_code, gift_registry_link,
                   ai_tone, response_style, active, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_events(&self) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, date, start_time, end_time, location_name, location_address,
                   location_map_link, parking_instructions, dress_code, gift_registry_link,
                   ai_tone, response_style, active, created_at, updated_at
            FROM events
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Newest event flagged active; the SMS channel routes to this one
    pub async fn get_active_event(&self) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, date, start_time, end_time, location_name, location_address,
                   location_map_link, parking_instructions, dress_code, gift_registry_link,
                   ai_tone, response_style, active, created_at, updated_at
            FROM events
            WHERE active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET
                name = COALESCE($2, name),
                date = COALESCE($3, date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                location_name = COALESCE($6, location_name),
                location_address = COALESCE($7, location_address),
                location_map_link = COALESCE($8, location_map_link),
                parking_instructions = COALESCE($9, parking_instructions),
                dress_code = COALESCE($10, dress_code),
                gift_registry_link = COALESCE($11, gift_registry_link),
                ai_tone = COALESCE($12, ai_tone),
                response_style = COALESCE($13, response_style),
                active = COALESCE($14, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, date, start_time, end_time, location_name, location_address,
                      location_map_link, parking_instructions, dress_code, gift_registry_link,
                      ai_tone, response_style, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location_name)
        .bind(&input.location_address)
        .bind(&input.location_map_link)
        .bind(&input.parking_instructions)
        .bind(&input.dress_code)
        .bind(&input.gift_registry_link)
        .bind(&input.ai_tone)
        .bind(&input.response_style)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Schedules
    // ============================================

    pub async fn create_schedule(&self, input: CreateSchedule) -> Result<ScheduleRow> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            INSERT INTO event_schedules (event_id, activity_name, start_time, end_time, description, location_detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, event_id, activity_name, start_time, end_time, description, location_detail, created_at
            "#,
        )
        .bind(input.event_id)
        .bind(&input.activity_name)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.description)
        .bind(&input.location_detail)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_schedules(&self, event_id: Uuid) -> Result<Vec<ScheduleRow>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, event_id, activity_name, start_time, end_time, description, location_detail, created_at
            FROM event_schedules
            WHERE event_id = $1
            ORDER BY start_time ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn delete_schedule(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // FAQs
    // ============================================

    pub async fn create_faq(&self, input: CreateFaq) -> Result<FaqRow> {
        let row = sqlx::query_as::<_, FaqRow>(
            r#"
            INSERT INTO faqs (event_id, question, answer)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, question, answer, created_at
            "#,
        )
        .bind(input.event_id)
        .bind(&input.question)
        .bind(&input.answer)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_faqs(&self, event_id: Uuid) -> Result<Vec<FaqRow>> {
        let rows = sqlx::query_as::<_, FaqRow>(
            r#"
            SELECT id, event_id, question, answer, created_at
            FROM faqs
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn delete_faq(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Guests
    // ============================================

    pub async fn create_guest(&self, input: CreateGuest) -> Result<GuestRow> {
        let row = sqlx::query_as::<_, GuestRow>(
            r#"
            INSERT INTO guests (event_id, name, phone, email, rsvp_status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, event_id, name, phone, email, rsvp_status, created_at
            "#,
        )
        .bind(input.event_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_guests(&self, event_id: Uuid) -> Result<Vec<GuestRow>> {
        let rows = sqlx::query_as::<_, GuestRow>(
            r#"
            SELECT id, event_id, name, phone, email, rsvp_status, created_at
            FROM guests
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_guest_rsvp(&self, id: Uuid, status: &str) -> Result<Option<GuestRow>> {
        let row = sqlx::query_as::<_, GuestRow>(
            r#"
            UPDATE guests
            SET rsvp_status = $2
            WHERE id = $1
            RETURNING id, event_id, name, phone, email, rsvp_status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_guest(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Chat contexts and messages
    // ============================================

    /// Atomic get-or-create keyed by (platform, chat_id).
    ///
    /// The no-op DO UPDATE makes the conflicting row visible to RETURNING, so
    /// concurrent first contacts all land on the same context.
    pub async fn upsert_chat_context(
        &self,
        event_id: Uuid,
        platform: &str,
        chat_id: &str,
    ) -> Result<ChatContextRow> {
        let row = sqlx::query_as::<_, ChatContextRow>(
            r#"
            INSERT INTO chat_contexts (event_id, platform, chat_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (platform, chat_id) DO UPDATE SET chat_id = EXCLUDED.chat_id
            RETURNING id, event_id, platform, chat_id, created_at
            "#,
        )
        .bind(event_id)
        .bind(platform)
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_chat_message(
        &self,
        context_id: Uuid,
        content: &str,
        is_assistant: bool,
    ) -> Result<ChatMessageRow> {
        let row = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            INSERT INTO chat_messages (context_id, content, is_assistant)
            VALUES ($1, $2, $3)
            RETURNING id, context_id, content, is_assistant, created_at
            "#,
        )
        .bind(context_id)
        .bind(content)
        .bind(is_assistant)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Up to `limit` most recent messages, newest first
    pub async fn recent_chat_messages(
        &self,
        context_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessageRow>> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            SELECT id, context_id, content, is_assistant, created_at
            FROM chat_messages
            WHERE context_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(context_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Unanswered questions
    // ============================================

    pub async fn create_unanswered_question(
        &self,
        input: CreateUnansweredQuestion,
    ) -> Result<UnansweredQuestionRow> {
        let row = sqlx::query_as::<_, UnansweredQuestionRow>(
            r#"
            INSERT INTO unanswered_questions (event_id, question, context, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, event_id, question, context, status, created_at, updated_at
            "#,
        )
        .bind(input.event_id)
        .bind(&input.question)
        .bind(&input.context)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_unanswered_questions(
        &self,
        event_id: Uuid,
        status: Option<&str>,
    ) -> Result<Vec<UnansweredQuestionRow>> {
        let rows = if let Some(status) = status {
            sqlx::query_as::<_, UnansweredQuestionRow>(
                r#"
                SELECT id, event_id, question, context, status, created_at, updated_at
                FROM unanswered_questions
                WHERE event_id = $1 AND status = $2
                ORDER BY created_at DESC
                "#,
            )
            .bind(event_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, UnansweredQuestionRow>(
                r#"
                SELECT id, event_id, question, context, status, created_at, updated_at
                FROM unanswered_questions
                WHERE event_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows)
    }

    pub async fn update_question_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<UnansweredQuestionRow>> {
        let row = sqlx::query_as::<_, UnansweredQuestionRow>(
            r#"
            UPDATE unanswered_questions
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, event_id, question, context, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // SMS settings
    // ============================================

    pub async fn get_sms_settings(&self, event_id: Uuid) -> Result<Option<SmsSettingsRow>> {
        let row = sqlx::query_as::<_, SmsSettingsRow>(
            r#"
            SELECT id, event_id, phone_number, auto_reply_enabled, created_at, updated_at
            FROM sms_settings
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn upsert_sms_settings(
        &self,
        event_id: Uuid,
        input: UpsertSmsSettings,
    ) -> Result<SmsSettingsRow> {
        let row = sqlx::query_as::<_, SmsSettingsRow>(
            r#"
            INSERT INTO sms_settings (event_id, phone_number, auto_reply_enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id) DO UPDATE
            SET phone_number = EXCLUDED.phone_number,
                auto_reply_enabled = EXCLUDED.auto_reply_enabled,
                updated_at = NOW()
            RETURNING id, event_id, phone_number, auto_reply_enabled, created_at, updated_at
            "#,
        )
        .bind(event_id)
        .bind(&input.phone_number)
        .bind(input.auto_reply_enabled)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
