//! Database model types.

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Outcome of a client's visit to a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Completed,
    Abandoned,
}

impl QueueStatus {
    /// Returns the string stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Parses a stored status. Unknown values yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }
}

/// A historical queue event stored in the `queuehistories` collection.
///
/// Measurement fields are optional because documents from different
/// producers do not all carry the same fields.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QueueHistory {
    pub id: Uuid,
    pub queue_name: String,
    pub user_id: Option<String>,
    /// Minutes spent waiting before service started. The training label.
    pub wait_time: Option<f64>,
    /// Minutes spent being served.
    pub time_spent: Option<f64>,
    pub queue_length: Option<i32>,
    pub hour_of_day: Option<i32>,
    pub day_of_week: Option<i32>,
    pub minute_of_day: Option<i32>,
    pub status: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl QueueHistory {
    /// Returns the parsed status, if present and recognized.
    #[must_use]
    pub fn queue_status(&self) -> Option<QueueStatus> {
        self.status.as_deref().and_then(QueueStatus::parse)
    }
}

/// Input for creating a new queue history record.
///
/// Deserializes from the same camelCase document shape the collection
/// has always used, so JSON exports can be inserted as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueHistory {
    pub queue_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub wait_time: Option<f64>,
    #[serde(default)]
    pub time_spent: Option<f64>,
    #[serde(default)]
    pub queue_length: Option<i32>,
    #[serde(default)]
    pub hour_of_day: Option<i32>,
    #[serde(default)]
    pub day_of_week: Option<i32>,
    #[serde(default)]
    pub minute_of_day: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateQueueHistory {
    /// Materializes the record the way the store would persist it.
    #[must_use]
    pub fn into_record(self, id: Uuid, recorded_at: DateTime<Utc>) -> QueueHistory {
        QueueHistory {
            id,
            queue_name: self.queue_name,
            user_id: self.user_id,
            wait_time: self.wait_time,
            time_spent: self.time_spent,
            queue_length: self.queue_length,
            hour_of_day: self.hour_of_day,
            day_of_week: self.day_of_week,
            minute_of_day: self.minute_of_day,
            status: self.status,
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(QueueStatus::parse("completed"), Some(QueueStatus::Completed));
        assert_eq!(QueueStatus::parse(" Abandoned "), Some(QueueStatus::Abandoned));
        assert_eq!(QueueStatus::parse("waiting"), None);
        assert_eq!(QueueStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_create_deserializes_document_shape() {
        let json = r#"{
            "queueName": "deposit",
            "userId": "client1",
            "waitTime": 10.5,
            "timeSpent": 5.0,
            "queueLength": 3,
            "hourOfDay": 14,
            "dayOfWeek": 2,
            "status": "completed"
        }"#;

        let record: CreateQueueHistory = serde_json::from_str(json).unwrap();
        assert_eq!(record.queue_name, "deposit");
        assert_eq!(record.wait_time, Some(10.5));
        assert_eq!(record.queue_length, Some(3));
        assert_eq!(record.minute_of_day, None);
    }
}
