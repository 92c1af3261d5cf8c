use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use super::{invalid_body, SubmissionResponse};
use crate::error::SubmissionError;
use crate::models::{SubmissionKind, SubmissionPayload};
use crate::startup::AppState;

const MISSING_FIELDS: &str = "Please provide both email and message.";

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitContactRequest {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
}

impl SubmitContactRequest {
    pub fn into_payload(self) -> Result<SubmissionPayload, SubmissionError> {
        self.validate()
            .map_err(|_| SubmissionError::validation(MISSING_FIELDS))?;

        match (self.email, self.message) {
            (Some(email), Some(message)) => Ok(SubmissionPayload::Contact { email, message }),
            _ => Err(SubmissionError::validation(MISSING_FIELDS)),
        }
    }
}

#[tracing::instrument(skip(state, body))]
pub async fn submit_request(
    State(state): State<AppState>,
    body: Result<Json<SubmitContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>), SubmissionError> {
    let pipeline = &state.pipeline;

    let payload = body
        .map_err(invalid_body)
        .and_then(|Json(request)| request.into_payload())
        .map_err(|e| pipeline.reject(SubmissionKind::Contact, e))?;

    let outcome = pipeline.submit(payload).await?;

    let message = if outcome.notified {
        "Request saved successfully and email sent!"
    } else {
        "Request saved successfully."
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            message: message.to_string(),
        }),
    ))
}
