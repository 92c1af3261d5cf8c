use super::{MailError, MailProvider, ProviderResponse};
use crate::config::SmtpConfig;
use crate::models::NotificationRequest;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Configuration(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { transport })
    }
}

fn build_message(request: &NotificationRequest) -> Result<Message, MailError> {
    let from_mailbox: Mailbox = request
        .from
        .parse()
        .map_err(|e| MailError::Configuration(format!("Invalid from address: {}", e)))?;

    let mut builder = Message::builder()
        .from(from_mailbox)
        .subject(&request.subject);

    for recipient in &request.recipients {
        let to_mailbox: Mailbox = recipient
            .parse()
            .map_err(|e| MailError::InvalidRecipient(format!("{}: {}", recipient, e)))?;
        builder = builder.to(to_mailbox);
    }

    builder
        .header(ContentType::TEXT_HTML)
        .body(request.html_body.clone())
        .map_err(|e| MailError::SendFailed(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl MailProvider for SmtpProvider {
    async fn send(&self, request: &NotificationRequest) -> Result<ProviderResponse, MailError> {
        let message = build_message(request)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(format!("Failed to send email: {}", e)))?;

        let provider_id = response.message().next().map(|s| s.to_string());

        tracing::info!(
            recipients = request.recipients.len(),
            subject = %request.subject,
            "Email sent via SMTP"
        );

        Ok(ProviderResponse::accepted(provider_id))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
