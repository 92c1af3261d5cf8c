//! Mock mail provider for tests and local runs.

use super::{MailError, MailProvider, ProviderResponse};
use crate::models::NotificationRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Records every notification instead of delivering it.
#[derive(Default)]
pub struct MockMailProvider {
    failing: AtomicBool,
    send_count: AtomicU64,
    sent: Mutex<Vec<NotificationRequest>>,
}

impl MockMailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send fails after being counted.
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of send attempts, including failed ones.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MailProvider for MockMailProvider {
    async fn send(&self, request: &NotificationRequest) -> Result<ProviderResponse, MailError> {
        let attempt = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::SendFailed(
                "Mock mail provider is set to fail".to_string(),
            ));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }

        tracing::info!(
            recipients = request.recipients.len(),
            subject = %request.subject,
            "[MOCK] Email would be sent"
        );

        Ok(ProviderResponse::accepted(Some(format!("mock-email-{}", attempt))))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
