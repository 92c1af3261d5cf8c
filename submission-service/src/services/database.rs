use crate::models::{SubmissionKind, SubmissionRecord};
use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match err.kind.as_ref() {
            ErrorKind::Write(_) => StoreError::Rejected(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Durable, insert-only storage for submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Writes a new record and returns the identity the store assigned to it.
    async fn insert(&self, record: &SubmissionRecord) -> Result<String, StoreError>;
    async fn health_check(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct MongoSubmissionStore {
    client: MongoClient,
    db: Database,
}

impl MongoSubmissionStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for submission-service");

        for kind in [SubmissionKind::Words, SubmissionKind::Contact] {
            let created_index = IndexModel::builder()
                .keys(doc! { "created_utc": -1 })
                .options(
                    IndexOptions::builder()
                        .name("created_utc_idx".to_string())
                        .build(),
                )
                .build();

            self.collection(kind)
                .create_index(created_index, None)
                .await
                .map_err(|e| {
                    tracing::error!(collection = %kind, "Failed to create created_utc index: {}", e);
                    AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
                })?;
        }

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn collection(&self, kind: SubmissionKind) -> Collection<SubmissionRecord> {
        self.db.collection(kind.collection())
    }
}

#[async_trait]
impl SubmissionStore for MongoSubmissionStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<String, StoreError> {
        let result = self
            .collection(record.kind())
            .insert_one(record, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert submission: {}", e);
                StoreError::from(e)
            })?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id.to_hex()),
            other => Ok(other.to_string()),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::Unavailable(e.to_string())
            })?;
        Ok(())
    }
}

/// Process-local store for tests and local runs without MongoDB.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    records: Mutex<Vec<SubmissionRecord>>,
    failing: AtomicBool,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write as unreachable.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<String, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is set to fail".to_string(),
            ));
        }

        let id = ObjectId::new();
        let mut stored = record.clone();
        stored.id = Some(id);

        self.records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .push(stored);

        tracing::debug!(id = %id, collection = %record.kind(), "[MEMORY] Submission stored");
        Ok(id.to_hex())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is set to fail".to_string(),
            ));
        }
        Ok(())
    }
}
