use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::SharedStore;
use crate::error::{Result, WorkerError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process store with key expiry and list push.
///
/// Used for local runs without Redis and as the store in tests. Expiry is
/// measured with `tokio::time::Instant`, so paused test clocks apply.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    lists: RwLock<HashMap<String, VecDeque<String>>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            lists: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WorkerError::StoreUnavailable(
                "memory store marked unavailable".to_string(),
            ))
        }
    }

    /// Remaining time to live of `key`, if it exists and has an expiry.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Snapshot of the list at `key`, head first.
    pub async fn list(&self, key: &str) -> Vec<String> {
        self.lists
            .read()
            .await
            .get(key)
            .map(|items| items.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn list_len(&self, key: &str) -> usize {
        self.lists.read().await.get(key).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn push(&self, list: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.lists
            .write()
            .await
            .entry(list.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }
}
