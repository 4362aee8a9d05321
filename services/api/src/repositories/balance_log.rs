//! Balance audit log, key `balance_log:{studentId}:{millis}:{nonce}`

use common::{KvStore, StoreResult, store::set_as};
use std::sync::Arc;
use uuid::Uuid;

use super::decode_entries;
use crate::models::BalanceLogEntry;

const PREFIX: &str = "balance_log:";

/// Append-only balance log
#[derive(Clone)]
pub struct BalanceLogRepository {
    store: Arc<dyn KvStore>,
}

impl BalanceLogRepository {
    /// Create a new balance log repository
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Millis are zero-padded so keys sort chronologically; the nonce keeps
    /// same-millisecond entries apart
    fn key(entry: &BalanceLogEntry, nonce: &str) -> String {
        format!(
            "{}{}:{:013}:{}",
            PREFIX,
            entry.student_id,
            entry.timestamp.timestamp_millis(),
            nonce
        )
    }

    /// Write a new entry and return its key
    pub async fn append(&self, entry: &BalanceLogEntry) -> StoreResult<String> {
        let key = Self::key(entry, &Uuid::new_v4().simple().to_string());
        set_as(self.store.as_ref(), &key, entry).await?;
        Ok(key)
    }

    /// Entries of one student, oldest first
    pub async fn list_for_student(&self, student_id: &str) -> StoreResult<Vec<BalanceLogEntry>> {
        decode_entries(
            self.store
                .scan_prefix(&format!("{}{}:", PREFIX, student_id))
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BalanceOperation;
    use chrono::Utc;
    use common::MemoryStore;

    fn entry(student: &str, new_balance: i64) -> BalanceLogEntry {
        BalanceLogEntry {
            student_id: student.to_string(),
            operation: BalanceOperation::Set,
            amount: new_balance,
            previous_balance: 0,
            new_balance,
            timestamp: Utc::now(),
            admin_id: "a1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_same_millisecond_entries_are_kept() {
        let repo = BalanceLogRepository::new(Arc::new(MemoryStore::new()));
        let first = entry("s1", 1);
        let mut second = entry("s1", 2);
        second.timestamp = first.timestamp;

        let k1 = repo.append(&first).await.unwrap();
        let k2 = repo.append(&second).await.unwrap();
        assert_ne!(k1, k2);
        assert!(k1.starts_with("balance_log:s1:"));

        assert_eq!(repo.list_for_student("s1").await.unwrap().len(), 2);
        assert!(repo.list_for_student("s").await.unwrap().is_empty());
    }
}
