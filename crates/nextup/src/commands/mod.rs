//! CLI command implementations.
//!
//! Commands that touch the queue history collection are generic over
//! [`database::QueueHistoryStore`], so they run against `PostgreSQL` in the
//! binary and against the in-memory store in tests.

pub mod clear;
pub mod coefficients;
pub mod insert;
pub mod predict;
pub mod report;
pub mod seed;
pub mod train;
