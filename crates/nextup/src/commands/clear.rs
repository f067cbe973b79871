//! Clear command - deletes every queue history record.

use anyhow::{Context, Result};
use database::QueueHistoryStore;
use tracing::info;

/// Runs the clear command and returns the number of deleted records.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn run(store: &impl QueueHistoryStore) -> Result<u64> {
    let deleted = store
        .delete_all()
        .await
        .context("Failed to delete queue history records")?;

    info!(deleted, "Cleared queuehistories");
    println!("Deleted {deleted} documents from 'queuehistories'");

    Ok(deleted)
}
