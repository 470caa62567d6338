// Prompt assembly
//
// Pure function: event context + recent history + the new message become a
// single prompt string. The event details are rendered as pretty-printed JSON
// so the model sees schedule and FAQ entries verbatim; history is rendered as
// alternating user/assistant turns. No truncation happens here, the history
// limit is applied upstream.

use serde_json::json;

use crate::context::{ChatTurn, EventContext};

/// Build the completion prompt for one guest message.
pub fn build_prompt(message: &str, event: &EventContext, history: &[ChatTurn]) -> String {
    let context = json!({
        "event": {
            "name": event.name,
            "date": event.date,
            "time": event.time_range(),
            "location": {
                "name": event.location_name,
                "address": event.location_address,
                "mapLink": event.location_map_link,
                "parking": event.parking_instructions,
            },
            "dressCode": event.dress_code,
            "giftRegistry": event.gift_registry_link,
            "schedule": event.schedules,
            "faqs": event.faqs,
        },
        "history": history
            .iter()
            .map(|turn| json!({ "role": turn.role(), "content": turn.content }))
            .collect::<Vec<_>>(),
    });

    // to_string_pretty cannot fail on a Value built from plain data
    let rendered = serde_json::to_string_pretty(&context).unwrap_or_default();

    format!(
        "You are an AI event assistant helping guests with questions about {name}.\n\
         Event context: {rendered}\n\n\
         User message: {message}\n\n\
         Respond naturally and helpfully to the user's question based on the event information provided.",
        name = event.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FaqEntry, ScheduleEntry};
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn smith_wedding() -> EventContext {
        EventContext {
            id: Uuid::now_v7(),
            name: "Smith Wedding".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: Some(NaiveTime::from_hms_opt(23, 0, 0).unwrap()),
            location_name: "Willow Barn".to_string(),
            location_address: "12 Orchard Lane".to_string(),
            location_map_link: Some("https://maps.example.com/willow".to_string()),
            parking_instructions: Some("Use lot B".to_string()),
            dress_code: Some("Cocktail attire".to_string()),
            gift_registry_link: None,
            ai_tone: "friendly".to_string(),
            response_style: "concise".to_string(),
            schedules: vec![ScheduleEntry {
                activity_name: "Ceremony".to_string(),
                start_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
                end_time: None,
                description: None,
                location_detail: Some("Garden".to_string()),
            }],
            faqs: vec![FaqEntry {
                question: "Is there parking?".to_string(),
                answer: "Yes, free lot B".to_string(),
            }],
        }
    }

    #[test]
    fn prompt_names_the_event_and_quotes_the_message() {
        let prompt = build_prompt("is there parking", &smith_wedding(), &[]);
        assert!(prompt.starts_with(
            "You are an AI event assistant helping guests with questions about Smith Wedding."
        ));
        assert!(prompt.contains("User message: is there parking"));
    }

    #[test]
    fn prompt_embeds_faq_and_schedule() {
        let prompt = build_prompt("hi", &smith_wedding(), &[]);
        assert!(prompt.contains("Is there parking?"));
        assert!(prompt.contains("Yes, free lot B"));
        assert!(prompt.contains("Ceremony"));
        assert!(prompt.contains("17:00:00 - 23:00:00"));
    }

    #[test]
    fn history_is_rendered_as_role_turns() {
        let history = vec![
            ChatTurn::user("what time does it start"),
            ChatTurn::assistant("The ceremony starts at 5:30pm."),
        ];
        let prompt = build_prompt("thanks", &smith_wedding(), &history);
        assert!(prompt.contains(r#""role": "user""#));
        assert!(prompt.contains(r#""role": "assistant""#));
        assert!(prompt.contains("The ceremony starts at 5:30pm."));
    }
}
