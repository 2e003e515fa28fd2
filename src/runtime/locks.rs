//! Per-sender serialisation
//!
//! Messages from one sender are handled one at a time so the read-modify-write
//! of their state entry cannot interleave. Distinct senders never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OwnedMutexGuard;

type SenderLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
pub struct SenderLocks {
    locks: Mutex<HashMap<String, SenderLock>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SenderLock>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until no other task is handling `sender`
    pub async fn acquire(&self, sender: &str) -> SenderGuard<'_> {
        let lock = Arc::clone(self.map().entry(sender.to_string()).or_default());
        let guard = lock.lock_owned().await;
        SenderGuard {
            locks: self,
            sender: sender.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.map().len()
    }
}

/// Held while a sender's message is processed
pub struct SenderGuard<'a> {
    locks: &'a SenderLocks,
    sender: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SenderGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones only happen under the map lock, so a count of one means
        // nobody holds or awaits this sender any more.
        let mut map = self.locks.map();
        if map
            .get(&self.sender)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.sender);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_sender_waits_for_release() {
        let locks = SenderLocks::new();
        let held = locks.acquire("5550001").await;

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("5550001")).await;
        assert!(blocked.is_err());

        drop(held);
        let reacquired =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("5550001")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn distinct_senders_do_not_block_each_other() {
        let locks = SenderLocks::new();
        let _first = locks.acquire("5550001").await;

        let other =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("5550002")).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn entries_are_pruned_after_release() {
        let locks = SenderLocks::new();
        {
            let _a = locks.acquire("a").await;
            let _b = locks.acquire("b").await;
            assert_eq!(locks.len(), 2);
        }
        assert_eq!(locks.len(), 0);
    }
}
