//! Mock implementations for testing
//!
//! These mocks enable engine and API tests without real I/O.

use super::traits::*;
use crate::db::InteractionRecord;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Reply Sender
// ============================================================================

/// Captures outbound replies instead of sending them
#[derive(Default)]
pub struct MockReplySender {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockReplySender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send is rejected (after being captured)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every send sleeps before completing
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// All `(recipient, text)` pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }
}

#[async_trait]
impl ReplySender for MockReplySender {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Mock Recorder
// ============================================================================

/// Keeps records in memory
#[derive(Default)]
pub struct MockRecorder {
    records: Mutex<Vec<InteractionRecord>>,
    fail: bool,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write is rejected and nothing is kept
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<InteractionRecord> {
        self.records().pop()
    }
}

#[async_trait]
impl InteractionRecorder for MockRecorder {
    async fn record(&self, record: &InteractionRecord) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 503,
                body: "mock failure".to_string(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Failing State Store
// ============================================================================

/// State store whose every operation fails
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn get(&self, _sender: &str) -> Result<Option<String>, StateStoreError> {
        Err(StateStoreError::Unavailable("mock outage".to_string()))
    }

    async fn set(&self, _sender: &str, _state: &str) -> Result<(), StateStoreError> {
        Err(StateStoreError::Unavailable("mock outage".to_string()))
    }

    async fn delete(&self, _sender: &str) -> Result<(), StateStoreError> {
        Err(StateStoreError::Unavailable("mock outage".to_string()))
    }

    async fn entries(&self) -> Result<Vec<(String, String)>, StateStoreError> {
        Err(StateStoreError::Unavailable("mock outage".to_string()))
    }
}

// ============================================================================
// Read-Only State Store
// ============================================================================

/// Serves preloaded states but rejects every write
pub struct ReadOnlyStateStore {
    inner: InMemoryStateStore,
}

impl ReadOnlyStateStore {
    pub async fn with_state(sender: &str, state: &str) -> Self {
        let inner = InMemoryStateStore::new();
        inner.set(sender, state).await.unwrap();
        Self { inner }
    }
}

#[async_trait]
impl StateStore for ReadOnlyStateStore {
    async fn get(&self, sender: &str) -> Result<Option<String>, StateStoreError> {
        self.inner.get(sender).await
    }

    async fn set(&self, _sender: &str, _state: &str) -> Result<(), StateStoreError> {
        Err(StateStoreError::Unavailable("read-only".to_string()))
    }

    async fn delete(&self, _sender: &str) -> Result<(), StateStoreError> {
        Err(StateStoreError::Unavailable("read-only".to_string()))
    }

    async fn entries(&self) -> Result<Vec<(String, String)>, StateStoreError> {
        self.inner.entries().await
    }
}
