//! Durable-write-then-notify pipeline behind every submission route.
//!
//! A submission is persisted first and only then announced by email. The two
//! steps are not atomic: when the store write succeeds and the mail send fails,
//! the record stays. [`NotifyPolicy`] decides whether that failure fails the
//! request.

use serde::Deserialize;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::metrics::{record_provider_call, record_submission};
use super::{MailProvider, SubmissionStore};
use crate::error::{PipelineStep, SubmissionError, SubmissionStage};
use crate::models::{NotificationRequest, SubmissionKind, SubmissionPayload, SubmissionRecord};

/// What a failed notification means for the request.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Mail failure fails the request even though the record was written.
    #[default]
    Required,
    /// Mail failure is logged and the request still succeeds.
    BestEffort,
}

impl FromStr for NotifyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(NotifyPolicy::Required),
            "best_effort" | "best-effort" => Ok(NotifyPolicy::BestEffort),
            other => Err(format!("unknown notify policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub from: String,
    pub recipients: Vec<String>,
    pub notify_policy: NotifyPolicy,
    /// Upper bound for each of the persist and notify steps.
    pub step_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub id: String,
    pub kind: SubmissionKind,
    /// False only when a best-effort notification failed.
    pub notified: bool,
    pub provider_id: Option<String>,
}

#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn SubmissionStore>,
    mailer: Arc<dyn MailProvider>,
    settings: Arc<PipelineSettings>,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        mailer: Arc<dyn MailProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            settings: Arc::new(settings),
        }
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Persist the payload, then notify. Validation has already happened.
    #[tracing::instrument(skip_all, fields(kind = %payload.kind()))]
    pub async fn submit(
        &self,
        payload: SubmissionPayload,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let kind = payload.kind();
        let record = SubmissionRecord::new(payload);

        let id = match bounded(
            self.settings.step_timeout,
            PipelineStep::Persist,
            self.store.insert(&record),
        )
        .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    stage = %e.stage(),
                    code = e.code(),
                    error = %e,
                    "Failed to persist submission"
                );
                record_submission(kind.collection(), e.stage().as_str());
                return Err(e);
            }
        };

        tracing::info!(id = %id, "Submission persisted");

        let notification = NotificationRequest::for_submission(
            &record.payload,
            &self.settings.from,
            &self.settings.recipients,
        );

        let sent = bounded(
            self.settings.step_timeout,
            PipelineStep::Notify,
            self.mailer.send(&notification),
        )
        .await;

        match sent {
            Ok(response) => {
                record_provider_call(self.mailer.name(), "success");
                record_submission(kind.collection(), SubmissionStage::Completed.as_str());
                tracing::info!(
                    id = %id,
                    provider = self.mailer.name(),
                    provider_id = ?response.provider_id,
                    "Submission completed"
                );
                Ok(SubmissionOutcome {
                    id,
                    kind,
                    notified: true,
                    provider_id: response.provider_id,
                })
            }
            Err(e) => {
                record_provider_call(self.mailer.name(), "failure");

                if self.settings.notify_policy == NotifyPolicy::BestEffort {
                    tracing::warn!(
                        id = %id,
                        code = e.code(),
                        error = %e,
                        "Notification failed; record kept under best-effort policy"
                    );
                    record_submission(kind.collection(), SubmissionStage::Completed.as_str());
                    return Ok(SubmissionOutcome {
                        id,
                        kind,
                        notified: false,
                        provider_id: None,
                    });
                }

                tracing::error!(
                    id = %id,
                    stage = %e.stage(),
                    code = e.code(),
                    error = %e,
                    record_persisted = true,
                    "Failed to send notification after persisting submission"
                );
                record_submission(kind.collection(), e.stage().as_str());
                Err(e)
            }
        }
    }

    /// Account for a request turned away before the pipeline ran.
    pub fn reject(&self, kind: SubmissionKind, error: SubmissionError) -> SubmissionError {
        tracing::info!(kind = %kind, error = %error, "Submission rejected");
        record_submission(kind.collection(), error.stage().as_str());
        error
    }
}

/// Run one step under the optional deadline.
async fn bounded<T, E, F>(
    limit: Option<Duration>,
    step: PipelineStep,
    fut: F,
) -> Result<T, SubmissionError>
where
    F: Future<Output = Result<T, E>>,
    SubmissionError: From<E>,
{
    match limit {
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(SubmissionError::from),
            Err(_) => Err(SubmissionError::Timeout { step, after }),
        },
        None => fut.await.map_err(SubmissionError::from),
    }
}
