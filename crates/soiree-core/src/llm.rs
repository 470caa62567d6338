// LLM client types
//
// Provider-agnostic contract for the completion call plus the parsing rules
// for what comes back. The model is instructed to answer with a JSON object
// carrying `response` and `confidence`, but it does not always comply, so the
// reply text is decoded into an explicit sum type: structured JSON when it
// parses, plain text wrapped with a default confidence otherwise.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Confidence assigned to replies the model returned as plain text
pub const DEFAULT_PLAIN_CONFIDENCE: f64 = 0.8;

/// A generated answer with its confidence score in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub response: String,
    pub confidence: f64,
}

/// Trait for language-model completion backends
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt and return the validated answer.
    async fn generate(&self, prompt: &str) -> Result<Reply>;
}

/// What the model's reply text turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// The requested JSON shape
    Structured { response: String, confidence: f64 },
    /// Anything else, taken verbatim
    Plain(String),
}

#[derive(Deserialize)]
struct StructuredReply {
    response: String,
    confidence: f64,
}

impl ModelReply {
    /// Classify the raw reply text.
    ///
    /// Text whose trimmed form starts with `{` and decodes with both
    /// `response` and `confidence` fields is structured; everything else is
    /// plain, kept untrimmed.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('{') {
            if let Ok(parsed) = serde_json::from_str::<StructuredReply>(trimmed) {
                return ModelReply::Structured {
                    response: parsed.response,
                    confidence: parsed.confidence,
                };
            }
        }
        ModelReply::Plain(text.to_string())
    }

    /// Convert into a `Reply`, clamping confidence into [0, 1].
    pub fn into_reply(self) -> Reply {
        match self {
            ModelReply::Structured {
                response,
                confidence,
            } => Reply {
                response,
                confidence: clamp_confidence(confidence),
            },
            ModelReply::Plain(text) => Reply {
                response: text,
                confidence: DEFAULT_PLAIN_CONFIDENCE,
            },
        }
    }
}

/// Clamp a raw confidence value into [0, 1]
pub fn clamp_confidence(raw: f64) -> f64 {
    raw.max(0.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_structured_json() {
        let reply = ModelReply::parse(r#"{"response": "Yes, free lot B", "confidence": 0.92}"#);
        assert_eq!(
            reply,
            ModelReply::Structured {
                response: "Yes, free lot B".to_string(),
                confidence: 0.92,
            }
        );
    }

    #[test]
    fn parses_structured_json_with_leading_whitespace() {
        let reply = ModelReply::parse("  \n{\"response\": \"hi\", \"confidence\": 0.5}");
        assert!(matches!(reply, ModelReply::Structured { .. }));
    }

    #[test]
    fn non_json_text_is_plain() {
        let reply = ModelReply::parse("The venue opens at 5pm.");
        assert_eq!(reply, ModelReply::Plain("The venue opens at 5pm.".to_string()));
    }

    #[test]
    fn json_missing_confidence_is_plain() {
        let text = r#"{"response": "hi"}"#;
        assert_eq!(ModelReply::parse(text), ModelReply::Plain(text.to_string()));
    }

    #[test]
    fn malformed_json_is_plain() {
        let text = "{not valid json";
        assert_eq!(ModelReply::parse(text), ModelReply::Plain(text.to_string()));
    }

    #[test]
    fn plain_reply_gets_default_confidence() {
        let reply = ModelReply::Plain("hello".to_string()).into_reply();
        assert_eq!(reply.response, "hello");
        assert_eq!(reply.confidence, 0.8);
    }

    #[test]
    fn structured_confidence_is_clamped() {
        let high = ModelReply::Structured {
            response: "a".to_string(),
            confidence: 4.2,
        }
        .into_reply();
        assert_eq!(high.confidence, 1.0);

        let low = ModelReply::Structured {
            response: "b".to_string(),
            confidence: -0.3,
        }
        .into_reply();
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn in_range_confidence_is_untouched() {
        assert_eq!(clamp_confidence(0.7), 0.7);
        assert_eq!(clamp_confidence(0.0), 0.0);
        assert_eq!(clamp_confidence(1.0), 1.0);
    }
}
