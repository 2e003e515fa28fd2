//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the engine with mock implementations and
//! swapping the in-memory state store for a shared one later.

use crate::db::{Database, DbError, InteractionRecord};
use crate::dialogue::TerminalOutcome;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Failure of an outbound reply or a record write
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("database error: {0}")]
    Database(#[from] DbError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("no usable credentials: {0}")]
    Credentials(String),
}

/// Failure of the conversation state store
#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("state store unavailable: {0}")]
    #[allow(dead_code)] // In-memory store never fails; shared stores do
    Unavailable(String),
}

/// Per-sender dialogue state labels
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, sender: &str) -> Result<Option<String>, StateStoreError>;

    async fn set(&self, sender: &str, state: &str) -> Result<(), StateStoreError>;

    async fn delete(&self, sender: &str) -> Result<(), StateStoreError>;

    /// All live entries, sorted by sender
    async fn entries(&self) -> Result<Vec<(String, String)>, StateStoreError>;
}

/// Outbound text channel back to the sender
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError>;
}

/// Sink for interaction records
#[async_trait]
pub trait InteractionRecorder: Send + Sync {
    async fn record(&self, record: &InteractionRecord) -> Result<(), DeliveryError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn get(&self, sender: &str) -> Result<Option<String>, StateStoreError> {
        (**self).get(sender).await
    }

    async fn set(&self, sender: &str, state: &str) -> Result<(), StateStoreError> {
        (**self).set(sender, state).await
    }

    async fn delete(&self, sender: &str) -> Result<(), StateStoreError> {
        (**self).delete(sender).await
    }

    async fn entries(&self) -> Result<Vec<(String, String)>, StateStoreError> {
        (**self).entries().await
    }
}

#[async_trait]
impl<T: ReplySender + ?Sized> ReplySender for Arc<T> {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        (**self).send(recipient, text).await
    }
}

#[async_trait]
impl<T: InteractionRecorder + ?Sized> InteractionRecorder for Arc<T> {
    async fn record(&self, record: &InteractionRecord) -> Result<(), DeliveryError> {
        (**self).record(record).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Process-lifetime state store. Entries never expire.
#[derive(Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, sender: &str) -> Result<Option<String>, StateStoreError> {
        Ok(self.entries.read().await.get(sender).cloned())
    }

    async fn set(&self, sender: &str, state: &str) -> Result<(), StateStoreError> {
        self.entries
            .write()
            .await
            .insert(sender.to_string(), state.to_string());
        Ok(())
    }

    async fn delete(&self, sender: &str) -> Result<(), StateStoreError> {
        self.entries.write().await.remove(sender);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>, StateStoreError> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(sender, state)| (sender.clone(), state.clone()))
            .collect();
        entries.sort();
        Ok(entries)
    }
}

/// Adapter to use Database as the append-only document store
#[derive(Clone)]
pub struct DatabaseRecorder {
    db: Database,
}

impl DatabaseRecorder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InteractionRecorder for DatabaseRecorder {
    async fn record(&self, record: &InteractionRecord) -> Result<(), DeliveryError> {
        // Follow-ups point back at what the sender asked last time
        if TerminalOutcome::from_label(&record.state_label)
            == Some(TerminalOutcome::FollowUpInProgress)
        {
            if let Some(previous) = self.db.latest_for_sender(&record.sender)? {
                let enriched = record
                    .clone()
                    .with_context(format!("Seguimiento de consulta previa: {}", previous.message));
                self.db.insert_interaction(&enriched)?;
                return Ok(());
            }
        }

        self.db.insert_interaction(record)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "database"
    }
}

/// Writes each record to every configured recorder.
///
/// Individual failures are logged; the call only fails when every
/// recorder failed.
pub struct FanoutRecorder {
    recorders: Vec<Arc<dyn InteractionRecorder>>,
}

impl FanoutRecorder {
    pub fn new(recorders: Vec<Arc<dyn InteractionRecorder>>) -> Self {
        Self { recorders }
    }
}

#[async_trait]
impl InteractionRecorder for FanoutRecorder {
    async fn record(&self, record: &InteractionRecord) -> Result<(), DeliveryError> {
        let pending = self.recorders.iter().map(|r| r.record(record));
        let results = futures::future::join_all(pending).await;

        let mut last_error = None;
        let mut succeeded = false;
        for (recorder, result) in self.recorders.iter().zip(results) {
            match result {
                Ok(()) => succeeded = true,
                Err(e) => {
                    tracing::error!(
                        recorder = recorder.name(),
                        sender = %record.sender,
                        error = %e,
                        "Failed to write interaction record"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !succeeded => Err(e),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}
