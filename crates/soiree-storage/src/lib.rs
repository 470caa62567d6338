// Postgres storage layer with sqlx
//
// This crate provides database implementations for the core traits:
// - DbAssistantStore: EventSource + ConversationStore + EscalationSink

pub mod assistant_store;
pub mod models;
pub mod repositories;

pub use assistant_store::DbAssistantStore;
pub use models::*;
pub use repositories::Database;
