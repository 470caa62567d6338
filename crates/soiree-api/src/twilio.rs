// Twilio REST client
//
// Direct HTTP against the messages endpoint; one configured client is built
// at process start and shared. Only the "create message" call is needed.

use serde::Deserialize;

use soiree_core::{AssistantError, Result};

const TWILIO_API_URL: &str = "https://api.twilio.com";

/// Minimal Twilio client for outbound SMS
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

impl TwilioClient {
    /// Create a client from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, and
    /// `TWILIO_PHONE_NUMBER`.
    pub fn from_env() -> Result<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| AssistantError::config("TWILIO_ACCOUNT_SID is not set"))?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| AssistantError::config("TWILIO_AUTH_TOKEN is not set"))?;
        let from_number = std::env::var("TWILIO_PHONE_NUMBER")
            .map_err(|_| AssistantError::config("TWILIO_PHONE_NUMBER is not set"))?;
        Ok(Self::with_base_url(
            account_sid,
            auth_token,
            from_number,
            TWILIO_API_URL.to_string(),
        ))
    }

    pub fn with_base_url(
        account_sid: String,
        auth_token: String,
        from_number: String,
        base_url: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one SMS and return the provider message sid.
    pub async fn send_message(&self, to: &str, body: &str) -> Result<String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", &self.from_number), ("Body", body)])
            .send()
            .await
            .map_err(|e| AssistantError::network(format!("twilio request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<TwilioError>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Err(AssistantError::network(format!(
                "twilio api error ({status}): {detail}"
            )));
        }

        let created: TwilioMessage = response
            .json()
            .await
            .map_err(|e| AssistantError::upstream(format!("undecodable twilio reply: {e}")))?;

        Ok(created.sid)
    }
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_form_encoded_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(body_string_contains("To=%2B15551234567"))
            .and(body_string_contains("Body=hello"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({ "sid": "SM42", "status": "queued" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = TwilioClient::with_base_url(
            "AC123".to_string(),
            "token".to_string(),
            "+15550000000".to_string(),
            server.uri(),
        );

        let sid = client.send_message("+15551234567", "hello").await.unwrap();
        assert_eq!(sid, "SM42");
    }

    #[tokio::test]
    async fn api_error_surfaces_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "Invalid 'To' phone number"
            })))
            .mount(&server)
            .await;

        let client = TwilioClient::with_base_url(
            "AC123".to_string(),
            "token".to_string(),
            "+15550000000".to_string(),
            server.uri(),
        );

        let err = client.send_message("bad", "hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Network(_)));
        assert!(err.to_string().contains("Invalid 'To' phone number"));
    }
}
