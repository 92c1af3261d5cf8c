pub mod notification;
pub mod submission;

pub use notification::NotificationRequest;
pub use submission::{SubmissionKind, SubmissionPayload, SubmissionRecord};
