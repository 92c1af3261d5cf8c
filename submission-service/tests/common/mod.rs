#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use service_core::config::Config as CoreConfig;
use submission_service::config::{
    MailBackend, MailConfig, SmtpConfig, StoreBackend, StoreConfig, SubmissionConfig,
    SubmissionSettings,
};
use submission_service::models::SubmissionKind;
use submission_service::services::{
    InMemorySubmissionStore, MailProvider, MockMailProvider, NotifyPolicy, SubmissionStore,
};
use submission_service::startup::Application;

pub const RECIPIENTS: [&str; 2] = ["ops@example.com", "sales@example.com"];

pub fn test_config() -> SubmissionConfig {
    SubmissionConfig {
        common: CoreConfig { port: 0 },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            uri: String::new(),
            database: "submissions_test".to_string(),
        },
        mail: MailConfig {
            provider: MailBackend::Mock,
            resend_api_key: String::new(),
            from: "onboarding@resend.dev".to_string(),
            recipients: RECIPIENTS.iter().map(|r| r.to_string()).collect(),
        },
        smtp: SmtpConfig {
            host: "smtp.test.local".to_string(),
            port: 587,
            user: "test".to_string(),
            password: "test".to_string(),
        },
        submission: SubmissionSettings {
            required_length: Some(24),
            notify_policy: NotifyPolicy::Required,
            step_timeout: Some(Duration::from_secs(2)),
            routes: vec![SubmissionKind::Words, SubmissionKind::Contact],
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemorySubmissionStore>,
    pub mailer: Arc<MockMailProvider>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: SubmissionConfig) -> Self {
        let store = Arc::new(InMemorySubmissionStore::new());
        let mailer = Arc::new(MockMailProvider::new());
        Self::spawn_with_collaborators(config, store, mailer).await
    }

    pub async fn spawn_with_collaborators(
        config: SubmissionConfig,
        store: Arc<InMemorySubmissionStore>,
        mailer: Arc<MockMailProvider>,
    ) -> Self {
        let app = Application::build_with(
            config,
            store.clone() as Arc<dyn SubmissionStore>,
            mailer.clone() as Arc<dyn MailProvider>,
        )
        .await
        .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            mailer,
            client,
        }
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn twenty_four_words() -> Vec<String> {
    (1..=24).map(|i| format!("word{:02}", i)).collect()
}
