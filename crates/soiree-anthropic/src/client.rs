// Anthropic messages-API client
//
// One POST per generation with a bounded retry loop: a transport error or
// non-2xx status is retried after 2^attempt seconds (1s, 2s), three attempts
// total, then the last error propagates. A successful status whose body does
// not carry the expected {content:[{text}]} shape is an upstream-format
// error and is not retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use soiree_core::{AssistantError, LlmClient, ModelReply, Reply, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const MAX_TOKENS: u32 = 1024;
const MAX_ATTEMPTS: u32 = 3;

const SYSTEM_PROMPT: &str =
    "You are an AI event assistant. Always respond in JSON format with 'response' and 'confidence' fields.";

/// Client for the Anthropic messages API
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    /// Create a client from the `ANTHROPIC_API_KEY` environment variable.
    ///
    /// `ANTHROPIC_MODEL` overrides the default model when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AssistantError::config("ANTHROPIC_API_KEY is not set"))?;
        let mut client = Self::new(api_key);
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            client.model = model;
        }
        Ok(client)
    }

    /// Create a client with an explicit API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_API_URL.to_string())
    }

    /// Model identifier this client sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create a client pointed at a custom base URL.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    async fn request_once(&self, prompt: &str) -> Result<reqwest::Response> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::network(format!("anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.map(|e| e.message))
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Err(AssistantError::network(format!(
                "anthropic api error ({status}): {detail}"
            )));
        }

        Ok(response)
    }

    /// Send the request, retrying transient failures with exponential backoff.
    async fn request_with_retry(&self, prompt: &str) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            match self.request_once(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        return Err(e);
                    }
                    let delay = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %e,
                        "anthropic call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<Reply> {
        let response = self.request_with_retry(prompt).await?;

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::upstream(format!("undecodable anthropic reply: {e}")))?;

        let text = body
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AssistantError::upstream("anthropic reply has no text content"))?;

        Ok(ModelReply::parse(text).into_reply())
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
