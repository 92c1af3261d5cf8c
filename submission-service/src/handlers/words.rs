use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{invalid_body, SubmissionResponse};
use crate::error::SubmissionError;
use crate::models::{SubmissionKind, SubmissionPayload};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitWordsRequest {
    pub words: Option<Vec<String>>,
}

impl SubmitWordsRequest {
    /// `required_length` of `None` only checks presence.
    pub fn into_payload(
        self,
        required_length: Option<usize>,
    ) -> Result<SubmissionPayload, SubmissionError> {
        match (self.words, required_length) {
            (Some(words), Some(n)) if words.len() == n => Ok(SubmissionPayload::Words { words }),
            (_, Some(n)) => Err(SubmissionError::validation(format!(
                "Please provide exactly {} words.",
                n
            ))),
            (Some(words), None) => Ok(SubmissionPayload::Words { words }),
            (None, None) => Err(SubmissionError::validation(
                "Please provide a list of words.",
            )),
        }
    }
}

#[tracing::instrument(skip(state, body))]
pub async fn submit_words(
    State(state): State<AppState>,
    body: Result<Json<SubmitWordsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>), SubmissionError> {
    let pipeline = &state.pipeline;

    let payload = body
        .map_err(invalid_body)
        .and_then(|Json(request)| request.into_payload(state.required_length))
        .map_err(|e| pipeline.reject(SubmissionKind::Words, e))?;

    let outcome = pipeline.submit(payload).await?;

    let message = if outcome.notified {
        "Words saved successfully and email sent!"
    } else {
        "Words saved successfully."
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            message: message.to_string(),
        }),
    ))
}
