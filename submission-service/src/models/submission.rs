use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which submission route a payload arrived on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    #[serde(rename = "words")]
    Words,
    #[serde(rename = "requests")]
    Contact,
}

impl SubmissionKind {
    /// Collection the records of this kind are written to.
    pub fn collection(&self) -> &'static str {
        match self {
            SubmissionKind::Words => "words",
            SubmissionKind::Contact => "requests",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            SubmissionKind::Words => "/words",
            SubmissionKind::Contact => "/requests",
        }
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for SubmissionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "words" => Ok(SubmissionKind::Words),
            "requests" => Ok(SubmissionKind::Contact),
            other => Err(format!("unknown submission route '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SubmissionPayload {
    Words { words: Vec<String> },
    Contact { email: String, message: String },
}

impl SubmissionPayload {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionPayload::Words { .. } => SubmissionKind::Words,
            SubmissionPayload::Contact { .. } => SubmissionKind::Contact,
        }
    }
}

/// One accepted submission. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(flatten)]
    pub payload: SubmissionPayload,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

impl SubmissionRecord {
    /// The identity is left to the store.
    pub fn new(payload: SubmissionPayload) -> Self {
        Self {
            id: None,
            payload,
            created_utc: Utc::now(),
        }
    }

    pub fn kind(&self) -> SubmissionKind {
        self.payload.kind()
    }
}
