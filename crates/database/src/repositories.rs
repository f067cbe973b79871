//! Repository functions for database operations.

use std::future::Future;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{CreateQueueHistory, QueueHistory};

/// Rows per `INSERT` statement. Ten bound columns per row keeps each
/// statement well under the `PostgreSQL` bind-parameter limit.
const INSERT_CHUNK_SIZE: usize = 1000;

const SELECT_COLUMNS: &str = "SELECT id, queue_name, user_id, wait_time, time_spent, queue_length, \
     hour_of_day, day_of_week, minute_of_day, status, recorded_at FROM queuehistories";

/// Operations the commands need from the `queuehistories` collection.
pub trait QueueHistoryStore {
    /// Returns every record in insertion order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<QueueHistory>, sqlx::Error>> + Send;

    /// Returns the records of one queue, most recently inserted first.
    fn list_by_queue(
        &self,
        queue_name: &str,
    ) -> impl Future<Output = Result<Vec<QueueHistory>, sqlx::Error>> + Send;

    /// Inserts all records and returns how many were written.
    fn insert_many(
        &self,
        records: Vec<CreateQueueHistory>,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Deletes every record and returns how many were removed.
    fn delete_all(&self) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Counts the records in the collection.
    fn count(&self) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;
}

/// Repository for queue history operations.
pub struct QueueHistoryRepository;

impl QueueHistoryRepository {
    /// Lists every record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<QueueHistory>, sqlx::Error> {
        sqlx::query_as::<_, QueueHistory>(&format!("{SELECT_COLUMNS} ORDER BY seq"))
            .fetch_all(pool)
            .await
    }

    /// Lists the records of one queue, most recently inserted first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_by_queue(
        pool: &PgPool,
        queue_name: &str,
    ) -> Result<Vec<QueueHistory>, sqlx::Error> {
        sqlx::query_as::<_, QueueHistory>(&format!(
            "{SELECT_COLUMNS} WHERE queue_name = $1 ORDER BY seq DESC"
        ))
        .bind(queue_name)
        .fetch_all(pool)
        .await
    }

    /// Inserts records in batches inside a single transaction.
    ///
    /// `seq` follows the order of `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails. No record is
    /// written in that case.
    pub async fn insert_many(
        pool: &PgPool,
        records: Vec<CreateQueueHistory>,
    ) -> Result<u64, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO queuehistories (id, queue_name, user_id, wait_time, time_spent, \
                 queue_length, hour_of_day, day_of_week, minute_of_day, status) ",
            );

            builder.push_values(chunk, |mut row, record| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(record.queue_name.clone())
                    .push_bind(record.user_id.clone())
                    .push_bind(record.wait_time)
                    .push_bind(record.time_spent)
                    .push_bind(record.queue_length)
                    .push_bind(record.hour_of_day)
                    .push_bind(record.day_of_week)
                    .push_bind(record.minute_of_day)
                    .push_bind(record.status.clone());
            });

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// Deletes every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM queuehistories")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts all records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM queuehistories")
            .fetch_one(pool)
            .await
    }
}

impl QueueHistoryStore for PgPool {
    async fn list_all(&self) -> Result<Vec<QueueHistory>, sqlx::Error> {
        QueueHistoryRepository::list_all(self).await
    }

    async fn list_by_queue(&self, queue_name: &str) -> Result<Vec<QueueHistory>, sqlx::Error> {
        QueueHistoryRepository::list_by_queue(self, queue_name).await
    }

    async fn insert_many(&self, records: Vec<CreateQueueHistory>) -> Result<u64, sqlx::Error> {
        QueueHistoryRepository::insert_many(self, records).await
    }

    async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        QueueHistoryRepository::delete_all(self).await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        QueueHistoryRepository::count(self).await
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

    fn waits(records: Vec<QueueHistory>) -> Vec<f64> {
        records.into_iter().filter_map(|r| r.wait_time).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_insert_many_spans_chunks(pool: PgPool) {
        let records: Vec<_> = (0..2500).map(|i| record("deposit", f64::from(i))).collect();

        let inserted = QueueHistoryRepository::insert_many(&pool, records).await.unwrap();
        assert_eq!(inserted, 2500);
        assert_eq!(pool.count().await.unwrap(), 2500);

        let inserted = pool
            .insert_many(vec![record("withdrawal", 7.0), record("deposit", 9.0)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(pool.count().await.unwrap(), 2502);

        let all = waits(pool.list_all().await.unwrap());
        assert_eq!(all.len(), 2502);
        assert_eq!(&all[..3], &[0.0, 1.0, 2.0]);
        assert_eq!(&all[2499..], &[2499.0, 7.0, 9.0]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_delete_all_leaves_zero(pool: PgPool) {
        pool.insert_many(vec![record("deposit", 1.0), record("withdrawal", 2.0)])
            .await
            .unwrap();

        assert_eq!(pool.delete_all().await.unwrap(), 2);
        assert_eq!(pool.count().await.unwrap(), 0);
        assert!(pool.list_all().await.unwrap().is_empty());
        assert_eq!(pool.delete_all().await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_list_by_queue_is_newest_first(pool: PgPool) {
        let records: Vec<_> = (1..=30)
            .flat_map(|w| [record("deposit", f64::from(w)), record("withdrawal", 100.0)])
            .collect();
        pool.insert_many(records).await.unwrap();
        pool.insert_many(vec![record("deposit", 31.0)]).await.unwrap();

        let expected: Vec<f64> = (1..=31).rev().map(f64::from).collect();
        assert_eq!(waits(pool.list_by_queue("deposit").await.unwrap()), expected);
        assert!(pool.list_by_queue("consultation").await.unwrap().is_empty());
    }
}
