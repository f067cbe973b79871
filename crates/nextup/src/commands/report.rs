//! Report command - summarizes the history of one queue.

use anyhow::{Context, Result};
use database::QueueHistoryStore;
use tracing::info;

use crate::stats::{
    QueueReport, detect_anomalies, exponential_moving_average, generate_report, moving_average,
    wait_times,
};

/// Everything the report command prints for one queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSummary {
    pub report: QueueReport,
    pub anomalies: Vec<f64>,
    pub moving_average: Option<i64>,
    pub exponential_moving_average: Option<f64>,
}

/// Runs the report command.
///
/// Returns `None` when the queue has no history.
///
/// # Errors
///
/// Returns an error if loading the history fails.
pub async fn run(
    store: &impl QueueHistoryStore,
    queue_name: &str,
    window: usize,
    alpha: f64,
) -> Result<Option<QueueSummary>> {
    let records = store
        .list_by_queue(queue_name)
        .await
        .with_context(|| format!("Failed to load history for {queue_name}"))?;

    let Some(report) = generate_report(&records) else {
        println!("No data available to generate report for {queue_name}");
        return Ok(None);
    };

    let waits = wait_times(&records);
    let summary = QueueSummary {
        report,
        anomalies: detect_anomalies(&waits),
        moving_average: moving_average(&waits, window),
        exponential_moving_average: exponential_moving_average(&waits, alpha),
    };

    info!(queue_name, clients = summary.report.total_clients, "Generated report");
    print_summary(queue_name, &summary);

    Ok(Some(summary))
}

fn print_summary(queue_name: &str, summary: &QueueSummary) {
    let report = &summary.report;
    let fmt_opt =
        |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));

    println!("Report for {queue_name}");
    println!("  Total clients:        {}", report.total_clients);
    println!("  Completed clients:    {}", report.completed_clients);
    println!("  Abandoned clients:    {}", report.abandoned_clients);
    println!("  Average wait time:    {}", fmt_opt(report.average_wait_time));
    println!("  Average time spent:   {}", fmt_opt(report.average_time_spent));
    println!(
        "  Moving average:       {}",
        summary
            .moving_average
            .map_or_else(|| "n/a".to_string(), |v| v.to_string())
    );
    println!(
        "  Exponential average:  {}",
        fmt_opt(summary.exponential_moving_average)
    );

    if summary.anomalies.is_empty() {
        println!("  No anomalies detected");
    } else {
        println!("  Anomalies:            {:?}", summary.anomalies);
    }
}
