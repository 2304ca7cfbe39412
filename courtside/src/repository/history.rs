use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::models::QueryResult;

use super::traits::QueryHistoryStore;

/// In-process history ring. Once full, saving evicts the oldest entry.
pub struct MemoryQueryHistory {
    capacity: usize,
    entries: Mutex<VecDeque<QueryResult>>,
}

impl MemoryQueryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<QueryResult>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryQueryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[async_trait]
impl QueryHistoryStore for MemoryQueryHistory {
    async fn save(&self, result: QueryResult) {
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(result);
    }

    async fn recent(&self, limit: usize) -> Vec<QueryResult> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    async fn len(&self) -> usize {
        self.lock().len()
    }
}
