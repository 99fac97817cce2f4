//! In-memory history store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{HistoryRecord, push_history};
use crate::storage::HistoryStore;

/// History kept for the lifetime of the process only.
pub struct MemoryHistoryStore {
    capacity: usize,
    entries: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn record(&self, entry: HistoryRecord) -> Result<Vec<HistoryRecord>> {
        let mut entries = self.entries.lock().await;
        push_history(&mut entries, entry, self.capacity);
        Ok(entries.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capacity_is_respected() {
        let store = MemoryHistoryStore::new(3);
        for number in ["JD00000001", "JD00000002", "JD00000003", "JD00000004"] {
            store.record(HistoryRecord::new(number, "京东快递")).await.unwrap();
        }
        let numbers: Vec<_> = store
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.tracking_number)
            .collect();
        assert_eq!(numbers, vec!["JD00000004", "JD00000003", "JD00000002"]);
    }
}
