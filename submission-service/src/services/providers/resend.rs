use super::{MailError, MailProvider, ProviderResponse};
use crate::models::NotificationRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Transactional mail through the Resend HTTP API.
pub struct ResendProvider {
    api_key: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

impl ResendProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, RESEND_API_URL.to_string())
    }

    /// Points the provider at a different API base, e.g. a local stub.
    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            api_key,
            endpoint,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MailProvider for ResendProvider {
    async fn send(&self, request: &NotificationRequest) -> Result<ProviderResponse, MailError> {
        if self.api_key.is_empty() {
            return Err(MailError::Configuration(
                "Resend API key is not set".to_string(),
            ));
        }

        if request.recipients.is_empty() {
            return Err(MailError::InvalidRecipient(
                "Notification has no recipients".to_string(),
            ));
        }

        let body = ResendEmail {
            from: &request.from,
            to: &request.recipients,
            subject: &request.subject,
            html: &request.html_body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Connection(format!("Failed to connect to Resend: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    MailError::Authentication(format!("Resend rejected API key: {}", text))
                }
                StatusCode::TOO_MANY_REQUESTS => MailError::RateLimited(text),
                StatusCode::UNPROCESSABLE_ENTITY => MailError::InvalidRecipient(text),
                _ => MailError::SendFailed(format!(
                    "Resend API returned error status {}: {}",
                    status, text
                )),
            });
        }

        let resend_response: ResendResponse = response.json().await.map_err(|e| {
            MailError::SendFailed(format!("Failed to parse Resend response: {}", e))
        })?;

        tracing::info!(
            recipients = request.recipients.len(),
            subject = %request.subject,
            provider_id = ?resend_response.id,
            "Email sent via Resend"
        );

        Ok(ProviderResponse::accepted(resend_response.id))
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
