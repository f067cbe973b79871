//! In-memory implementation of the queue history store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use crate::models::{CreateQueueHistory, QueueHistory};
use crate::repositories::QueueHistoryStore;

/// A [`QueueHistoryStore`] backed by a vector.
///
/// Used for dry runs and tests. The vector is kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryQueueHistoryStore {
    records: Mutex<Vec<QueueHistory>>,
}

impl MemoryQueueHistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueueHistory>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueueHistoryStore for MemoryQueueHistoryStore {
    async fn list_all(&self) -> Result<Vec<QueueHistory>, sqlx::Error> {
        Ok(self.lock().clone())
    }

    async fn list_by_queue(&self, queue_name: &str) -> Result<Vec<QueueHistory>, sqlx::Error> {
        Ok(self
            .lock()
            .iter()
            .rev()
            .filter(|r| r.queue_name == queue_name)
            .cloned()
            .collect())
    }

    async fn insert_many(&self, records: Vec<CreateQueueHistory>) -> Result<u64, sqlx::Error> {
        let recorded_at = Utc::now();
        let inserted = records.len() as u64;

        self.lock().extend(
            records
                .into_iter()
                .map(|record| record.into_record(Uuid::new_v4(), recorded_at)),
        );

        Ok(inserted)
    }

    async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let mut stored = self.lock();
        let deleted = stored.len() as u64;
        stored.clear();
        Ok(deleted)
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        Ok(self.lock().len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(queue_name: &str, wait_time: f64) -> CreateQueueHistory {
        CreateQueueHistory {
            queue_name: queue_name.to_string(),
            wait_time: Some(wait_time),
            ..CreateQueueHistory::default()
        }
    }

    #[tokio::test]
    async fn test_insert_increases_count_by_n() {
        let store = MemoryQueueHistoryStore::new();
        store.insert_many(vec![record("deposit", 1.0)]).await.unwrap();
        let before = store.count().await.unwrap();

        let inserted = store
            .insert_many(vec![
                record("deposit", 2.0),
                record("withdrawal", 3.0),
                record("consultation", 4.0),
            ])
            .await
            .unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(store.count().await.unwrap(), before + 3);
    }

    #[tokio::test]
    async fn test_delete_all_leaves_zero() {
        let store = MemoryQueueHistoryStore::new();
        store
            .insert_many(vec![record("deposit", 1.0), record("withdrawal", 2.0)])
            .await
            .unwrap();

        let deleted = store.delete_all().await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_insert_is_a_no_op() {
        let store = MemoryQueueHistoryStore::new();
        assert_eq!(store.insert_many(Vec::new()).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders() {
        let store = MemoryQueueHistoryStore::new();
        store
            .insert_many(vec![
                record("deposit", 1.0),
                record("withdrawal", 2.0),
                record("deposit", 3.0),
            ])
            .await
            .unwrap();

        let all: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.wait_time)
            .collect();
        assert_eq!(all, vec![1.0, 2.0, 3.0]);

        let deposits: Vec<_> = store
            .list_by_queue("deposit")
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.wait_time)
            .collect();
        assert_eq!(deposits, vec![3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_single_batch_keeps_insertion_order() {
        let store = MemoryQueueHistoryStore::new();
        store
            .insert_many((1..=30).map(|w| record("deposit", f64::from(w))).collect())
            .await
            .unwrap();

        let records = store.list_by_queue("deposit").await.unwrap();
        assert!(records.iter().all(|r| r.recorded_at == records[0].recorded_at));

        let waits: Vec<f64> = records.into_iter().filter_map(|r| r.wait_time).collect();
        let expected: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        assert_eq!(waits, expected);
    }
}
