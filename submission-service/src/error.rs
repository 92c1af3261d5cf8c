//! Per-request failure taxonomy and its single mapping onto the wire.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::services::{MailError, StoreError};

/// Response header carrying the internal failure code. The body shape stays `{error}`.
pub const ERROR_CODE_HEADER: &str = "x-error-code";

/// Body for every server-side failure, whichever step failed.
pub const GENERIC_SERVER_ERROR: &str = "An error occurred while processing your request.";

/// The side-effecting steps of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Persist,
    Notify,
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStep::Persist => write!(f, "persist"),
            PipelineStep::Notify => write!(f, "notify"),
        }
    }
}

/// Terminal states of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Rejected,
    PersistFailed,
    NotifyFailed,
    Completed,
}

impl SubmissionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStage::Rejected => "rejected",
            SubmissionStage::PersistFailed => "persist_failed",
            SubmissionStage::NotifyFailed => "notify_failed",
            SubmissionStage::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("{step} step timed out after {after:?}")]
    Timeout { step: PipelineStep, after: Duration },
}

impl SubmissionError {
    pub fn validation(message: impl Into<String>) -> Self {
        SubmissionError::Validation(message.into())
    }

    pub fn stage(&self) -> SubmissionStage {
        match self {
            SubmissionError::Validation(_) => SubmissionStage::Rejected,
            SubmissionError::Store(_) => SubmissionStage::PersistFailed,
            SubmissionError::Mail(_) => SubmissionStage::NotifyFailed,
            SubmissionError::Timeout {
                step: PipelineStep::Persist,
                ..
            } => SubmissionStage::PersistFailed,
            SubmissionError::Timeout {
                step: PipelineStep::Notify,
                ..
            } => SubmissionStage::NotifyFailed,
        }
    }

    /// Machine-readable code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::Validation(_) => "validation_failed",
            SubmissionError::Store(_) => "persist_failed",
            SubmissionError::Mail(_) => "notify_failed",
            SubmissionError::Timeout {
                step: PipelineStep::Persist,
                ..
            } => "persist_timeout",
            SubmissionError::Timeout {
                step: PipelineStep::Notify,
                ..
            } => "notify_timeout",
        }
    }

    /// Whether a record was durably written before the failure.
    /// `None` when a persist timeout leaves it unknown.
    pub fn record_persisted(&self) -> Option<bool> {
        match self {
            SubmissionError::Validation(_) | SubmissionError::Store(_) => Some(false),
            SubmissionError::Mail(_) => Some(true),
            SubmissionError::Timeout { step, .. } => match step {
                PipelineStep::Persist => None,
                PipelineStep::Notify => Some(true),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = self.status_code();
        let code = self.code();
        let error = match self {
            SubmissionError::Validation(message) => message,
            _ => GENERIC_SERVER_ERROR.to_string(),
        };

        let mut res = (status, Json(ErrorResponse { error })).into_response();
        res.headers_mut()
            .insert(ERROR_CODE_HEADER, HeaderValue::from_static(code));
        res
    }
}
