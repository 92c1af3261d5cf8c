//! Application startup and lifecycle management.
//!
//! Builds the store and mail collaborators once, wires them into the shared
//! [`AppState`], and serves the HTTP router.

use crate::config::{MailBackend, StoreBackend, SubmissionConfig};
use crate::handlers::{
    health_check, metrics_endpoint, not_found, readiness_check, submit_request, submit_words,
};
use crate::models::SubmissionKind;
use crate::services::{
    InMemorySubmissionStore, MailProvider, MockMailProvider, MongoSubmissionStore,
    PipelineSettings, ResendProvider, SmtpProvider, SubmissionPipeline, SubmissionStore,
};
use axum::{middleware, routing::get, routing::post, Router};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. Cloned per request; the collaborators inside are shared.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SubmissionPipeline,
    pub required_length: Option<usize>,
}

impl AppState {
    pub fn new(
        config: &SubmissionConfig,
        store: Arc<dyn SubmissionStore>,
        mailer: Arc<dyn MailProvider>,
    ) -> Self {
        let settings = PipelineSettings {
            from: config.mail.from.clone(),
            recipients: config.mail.recipients.clone(),
            notify_policy: config.submission.notify_policy,
            step_timeout: config.submission.step_timeout,
        };

        Self {
            pipeline: SubmissionPipeline::new(store, mailer, settings),
            required_length: config.submission.required_length,
        }
    }
}

/// Build the HTTP router with only the configured submission routes mounted.
pub fn build_router(state: AppState, routes: &[SubmissionKind]) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint));

    for kind in routes {
        router = match kind {
            SubmissionKind::Words => router.route(kind.path(), post(submit_words)),
            SubmissionKind::Contact => router.route(kind.path(), post(submit_request)),
        };
    }

    router
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn connect_store(config: &SubmissionConfig) -> Result<Arc<dyn SubmissionStore>, AppError> {
    match config.store.backend {
        StoreBackend::Mongodb => {
            let store = MongoSubmissionStore::connect(&config.store.uri, &config.store.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;

            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;

            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory submission store; records are not durable");
            Ok(Arc::new(InMemorySubmissionStore::new()))
        }
    }
}

fn build_mailer(config: &SubmissionConfig) -> Result<Arc<dyn MailProvider>, AppError> {
    let mailer: Arc<dyn MailProvider> = match config.mail.provider {
        MailBackend::Resend => {
            tracing::info!("Resend mail provider initialized");
            Arc::new(ResendProvider::new(config.mail.resend_api_key.clone()))
        }
        MailBackend::Smtp => {
            let provider = SmtpProvider::new(config.smtp.clone()).map_err(|e| {
                tracing::error!("Failed to initialize SMTP provider: {}", e);
                AppError::EmailError(e.to_string())
            })?;
            tracing::info!("SMTP mail provider initialized");
            Arc::new(provider)
        }
        MailBackend::Mock => {
            tracing::warn!("Using mock mail provider; no email will be delivered");
            Arc::new(MockMailProvider::new())
        }
    };
    Ok(mailer)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the collaborators named in the configuration.
    pub async fn build(config: SubmissionConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        let mailer = build_mailer(&config)?;
        Self::build_with(config, store, mailer).await
    }

    /// Build the application around caller-supplied collaborators.
    pub async fn build_with(
        config: SubmissionConfig,
        store: Arc<dyn SubmissionStore>,
        mailer: Arc<dyn MailProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(&config, store, mailer);
        let router = build_router(state, &config.submission.routes);

        // Port 0 picks a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            routes = ?config.submission.routes,
            required_length = ?config.submission.required_length,
            notify_policy = ?config.submission.notify_policy,
            "Submission service listening"
        );

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `signal` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
