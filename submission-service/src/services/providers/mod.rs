pub mod mock;
pub mod resend;
pub mod smtp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NotificationRequest;

pub use mock::MockMailProvider;
pub use resend::ResendProvider;
pub use smtp::SmtpProvider;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication error: {0}")]
    Authentication(String),
}

/// Delivery acknowledgment returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub provider_id: Option<String>,
}

impl ProviderResponse {
    pub fn accepted(provider_id: Option<String>) -> Self {
        Self { provider_id }
    }
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> Result<ProviderResponse, MailError>;

    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;
}
