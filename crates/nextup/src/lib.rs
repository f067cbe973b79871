//! Queue wait-time estimator
//!
//! Seeds the queue history collection, trains a linear regression of wait
//! time on queue features, and serves single-shot predictions from the
//! persisted model.

pub mod commands;
pub mod stats;
pub mod synthetic;
