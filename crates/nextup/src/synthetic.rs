//! Synthetic queue history generation.
//!
//! Mimics the branch simulation: clients arrive at one of three service
//! queues during opening hours, wait `base * (queueLength + 1)` minutes
//! where `base` is drawn from the queue's service-time range, and a tenth of
//! clients facing a non-empty queue abandon it.

use std::ops::RangeInclusive;

use database::{CreateQueueHistory, QueueStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Service characteristics of one queue.
#[derive(Debug, Clone)]
pub struct QueueProfile {
    pub name: &'static str,
    /// Minutes needed to serve one client.
    pub service_minutes: RangeInclusive<i32>,
}

/// The queues modelled by the simulation.
pub static QUEUE_PROFILES: [QueueProfile; 3] = [
    QueueProfile {
        name: "deposit",
        service_minutes: 1..=5,
    },
    QueueProfile {
        name: "withdrawal",
        service_minutes: 2..=7,
    },
    QueueProfile {
        name: "consultation",
        service_minutes: 5..=10,
    },
];

/// Opening hours, inclusive.
pub const OPENING_HOURS: RangeInclusive<i32> = 8..=17;

/// Longest queue a client can find on arrival.
pub const MAX_QUEUE_LENGTH: i32 = 20;

/// Probability that a client facing a non-empty queue leaves.
pub const ABANDON_PROBABILITY: f64 = 0.1;

/// Generates `count` records deterministically from `seed`.
#[must_use]
pub fn generate(count: usize, seed: u64) -> Vec<CreateQueueHistory> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| generate_one(&mut rng)).collect()
}

fn generate_one(rng: &mut impl Rng) -> CreateQueueHistory {
    let profile = &QUEUE_PROFILES[rng.random_range(0..QUEUE_PROFILES.len())];

    let queue_length = rng.random_range(0..=MAX_QUEUE_LENGTH);
    let hour_of_day = rng.random_range(OPENING_HOURS);
    let minute = rng.random_range(0..60);
    let day_of_week = rng.random_range(0..=6);

    let base = rng.random_range(profile.service_minutes.clone());
    let wait_time = f64::from(base * queue_length + base);

    let abandoned = queue_length > 0 && rng.random_bool(ABANDON_PROBABILITY);
    let (status, time_spent) = if abandoned {
        (QueueStatus::Abandoned, None)
    } else {
        let service = rng.random_range(profile.service_minutes.clone());
        (QueueStatus::Completed, Some(f64::from(service)))
    };

    CreateQueueHistory {
        queue_name: profile.name.to_string(),
        user_id: Some(format!("client{}", rng.random_range(0..1000))),
        wait_time: Some(wait_time),
        time_spent,
        queue_length: Some(queue_length),
        hour_of_day: Some(hour_of_day),
        day_of_week: Some(day_of_week),
        minute_of_day: Some(hour_of_day * 60 + minute),
        status: Some(status.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_seeded() {
        assert_eq!(generate(50, 7), generate(50, 7));
        assert_ne!(generate(50, 7), generate(50, 8));
    }

    #[test]
    fn test_records_respect_ranges() {
        for record in generate(500, 42) {
            let profile = QUEUE_PROFILES
                .iter()
                .find(|p| p.name == record.queue_name)
                .expect("known queue");

            let queue_length = record.queue_length.unwrap();
            let hour = record.hour_of_day.unwrap();
            let minute_of_day = record.minute_of_day.unwrap();
            let wait_time = record.wait_time.unwrap();

            assert!((0..=MAX_QUEUE_LENGTH).contains(&queue_length));
            assert!(OPENING_HOURS.contains(&hour));
            assert!((0..=6).contains(&record.day_of_week.unwrap()));
            assert_eq!(minute_of_day / 60, hour);

            let per_client = wait_time / f64::from(queue_length + 1);
            assert!(profile.service_minutes.contains(&(per_client as i32)));
            assert_eq!(per_client.fract(), 0.0);

            match record.status.as_deref() {
                Some("abandoned") => {
                    assert!(queue_length > 0);
                    assert!(record.time_spent.is_none());
                }
                Some("completed") => assert!(record.time_spent.is_some()),
                other => panic!("unexpected status {other:?}"),
            }
        }
    }
}
