// Event context and conversation types
//
// EventContext is the read-only snapshot the pipeline works from: the event
// record merged with its ordered schedule and FAQ lists. It is loaded fresh
// for every inbound message (no caching).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transport a guest message arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Sms,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Sms => "sms",
            Platform::Web => "web",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event record merged with its schedule and FAQ lists
#[derive(Debug, Clone)]
pub struct EventContext {
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
    pub schedules: Vec<ScheduleEntry>,
    pub faqs: Vec<FaqEntry>,
}

impl EventContext {
    /// Combined time range, e.g. "17:00:00 - 23:00:00" or just the start
    pub fn time_range(&self) -> String {
        match self.end_time {
            Some(end) => format!("{} - {}", self.start_time, end),
            None => self.start_time.to_string(),
        }
    }
}

/// One schedule activity within an event, ordered by start time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub activity_name: String,
    pub start_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_detail: Option<String>,
}

/// Question/answer pair attached to an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// One turn of stored conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub content: String,
    pub is_assistant: bool,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_assistant: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_assistant: true,
        }
    }

    /// Role name as rendered into the prompt
    pub fn role(&self) -> &'static str {
        if self.is_assistant {
            "assistant"
        } else {
            "user"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_with_end() {
        let ctx = test_event(Some(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
        assert_eq!(ctx.time_range(), "17:00:00 - 23:00:00");
    }

    #[test]
    fn time_range_without_end() {
        let ctx = test_event(None);
        assert_eq!(ctx.time_range(), "17:00:00");
    }

    fn test_event(end_time: Option<NaiveTime>) -> EventContext {
        EventContext {
            id: Uuid::now_v7(),
            name: "Smith Wedding".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time,
            location_name: "The Barn".to_string(),
            location_address: "1 Main St".to_string(),
            location_map_link: None,
            parking_instructions: None,
            dress_code: None,
            gift_registry_link: None,
            ai_tone: "friendly".to_string(),
            response_style: "concise".to_string(),
            schedules: vec![],
            faqs: vec![],
        }
    }
}
