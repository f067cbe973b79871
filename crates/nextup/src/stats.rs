//! Queue statistics computed from stored history.
//!
//! Every function takes the records of a single queue, newest first, as
//! returned by `QueueHistoryStore::list_by_queue`.

use database::{QueueHistory, QueueStatus};

/// Number of recent wait times averaged by [`moving_average`].
pub const MOVING_AVERAGE_WINDOW: usize = 10;

/// Wait times above this multiple of the mean are anomalies.
pub const ANOMALY_FACTOR: f64 = 1.5;

/// Default smoothing factor of [`exponential_moving_average`].
pub const DEFAULT_EMA_ALPHA: f64 = 0.3;

/// Summary of one queue's history.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueReport {
    pub total_clients: usize,
    /// Mean over records that carry a wait time.
    pub average_wait_time: Option<f64>,
    /// Mean over records that carry a time spent.
    pub average_time_spent: Option<f64>,
    pub completed_clients: usize,
    pub abandoned_clients: usize,
}

/// Summarizes a queue's records. Returns `None` when there are none.
#[must_use]
pub fn generate_report(records: &[QueueHistory]) -> Option<QueueReport> {
    if records.is_empty() {
        return None;
    }

    let count_status = |status| {
        records
            .iter()
            .filter(|r| r.queue_status() == Some(status))
            .count()
    };

    Some(QueueReport {
        total_clients: records.len(),
        average_wait_time: mean(records.iter().filter_map(|r| r.wait_time)),
        average_time_spent: mean(records.iter().filter_map(|r| r.time_spent)),
        completed_clients: count_status(QueueStatus::Completed),
        abandoned_clients: count_status(QueueStatus::Abandoned),
    })
}

/// Wait times strictly above [`ANOMALY_FACTOR`] times the mean.
#[must_use]
pub fn detect_anomalies(wait_times: &[f64]) -> Vec<f64> {
    let Some(average) = mean(wait_times.iter().copied()) else {
        return Vec::new();
    };
    let threshold = average * ANOMALY_FACTOR;

    wait_times
        .iter()
        .copied()
        .filter(|&w| w > threshold)
        .collect()
}

/// Mean of the `window` most recent wait times, rounded to whole minutes.
#[must_use]
pub fn moving_average(newest_first: &[f64], window: usize) -> Option<i64> {
    let recent = newest_first.iter().take(window.max(1)).copied();
    mean(recent).map(|m| m.round() as i64)
}

/// Exponential moving average, folded from the oldest wait time to the
/// newest and seeded with the oldest.
#[must_use]
pub fn exponential_moving_average(newest_first: &[f64], alpha: f64) -> Option<f64> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mut oldest_first = newest_first.iter().rev().copied();
    let seed = oldest_first.next()?;

    Some(oldest_first.fold(seed, |ema, value| alpha * value + (1.0 - alpha) * ema))
}

/// Wait times of the records that carry one, keeping the input order.
#[must_use]
pub fn wait_times(records: &[QueueHistory]) -> Vec<f64> {
    records.iter().filter_map(|r| r.wait_time).collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
