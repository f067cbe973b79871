//! Seed command - inserts synthetic queue history records.

use anyhow::{Context, Result};
use database::QueueHistoryStore;
use tracing::info;

use crate::synthetic;

/// Runs the seed command and returns the number of inserted records.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn run(store: &impl QueueHistoryStore, count: usize, seed: u64) -> Result<u64> {
    info!(count, seed, "Generating synthetic queue history");

    let records = synthetic::generate(count, seed);
    let inserted = store
        .insert_many(records)
        .await
        .context("Failed to insert synthetic records")?;

    println!("Inserted {inserted} synthetic documents into 'queuehistories'");

    Ok(inserted)
}
