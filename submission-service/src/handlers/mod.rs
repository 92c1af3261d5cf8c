//! HTTP handlers for submission-service.

pub mod health;
pub mod requests;
pub mod words;

pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use requests::submit_request;
pub use words::submit_words;

use axum::extract::rejection::JsonRejection;
use serde::Serialize;

use crate::error::SubmissionError;

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub message: String,
}

/// Malformed bodies get the same `{error}` shape as failed validation.
pub(crate) fn invalid_body(rejection: JsonRejection) -> SubmissionError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    SubmissionError::validation("Invalid request body.")
}
