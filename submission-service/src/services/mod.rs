pub mod database;
pub mod metrics;
pub mod pipeline;
pub mod providers;

pub use database::{InMemorySubmissionStore, MongoSubmissionStore, StoreError, SubmissionStore};
pub use self::metrics::{get_metrics, init_metrics, record_provider_call, record_submission};
pub use pipeline::{NotifyPolicy, PipelineSettings, SubmissionOutcome, SubmissionPipeline};
pub use providers::{
    MailError, MailProvider, MockMailProvider, ProviderResponse, ResendProvider, SmtpProvider,
};
