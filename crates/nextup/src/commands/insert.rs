//! Insert command - adds the reference records or a JSON file of records.

use std::path::Path;

use anyhow::{Context, Result};
use database::{CreateQueueHistory, QueueHistoryStore, QueueStatus};
use tracing::info;

/// The two reference documents used to smoke-test a fresh collection.
#[must_use]
pub fn reference_records() -> Vec<CreateQueueHistory> {
    vec![
        CreateQueueHistory {
            queue_name: "deposit".to_string(),
            user_id: Some("client1".to_string()),
            wait_time: Some(10.5),
            time_spent: Some(5.0),
            queue_length: Some(3),
            hour_of_day: Some(14),
            day_of_week: Some(2),
            minute_of_day: None,
            status: Some(QueueStatus::Completed.as_str().to_string()),
        },
        CreateQueueHistory {
            queue_name: "withdrawal".to_string(),
            user_id: Some("client2".to_string()),
            wait_time: Some(8.0),
            time_spent: Some(4.0),
            queue_length: Some(2),
            hour_of_day: Some(10),
            day_of_week: Some(3),
            minute_of_day: None,
            status: Some(QueueStatus::Completed.as_str().to_string()),
        },
    ]
}

/// Runs the insert command.
///
/// Inserts every record of `file` (a JSON array of documents) when given,
/// otherwise the reference records.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the insert
/// fails.
pub async fn run(store: &impl QueueHistoryStore, file: Option<&Path>) -> Result<u64> {
    let records = match file {
        Some(path) => load_records_file(path)?,
        None => reference_records(),
    };

    info!(records = records.len(), "Inserting queue history");

    let inserted = store
        .insert_many(records)
        .await
        .context("Failed to insert queue history records")?;

    println!("Inserted {inserted} documents into 'queuehistories'");

    Ok(inserted)
}

/// Loads documents from a JSON array file.
fn load_records_file(path: &Path) -> Result<Vec<CreateQueueHistory>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let records: Vec<CreateQueueHistory> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of queue documents", path.display()))?;

    if let Some(position) = records.iter().position(|r| r.queue_name.trim().is_empty()) {
        anyhow::bail!("Document {position} in {} has an empty queueName", path.display());
    }

    Ok(records)
}
