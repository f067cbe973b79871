//! Wait-time regression model.
//!
//! Fits an ordinary least squares model of wait time on queue features,
//! scores it with R², and persists it together with the ordered feature
//! names it was fitted on.

mod artifact;
mod dataset;
mod error;
mod regression;

pub use artifact::{ARTIFACT_VERSION, ModelArtifact, TrainingMetrics};
pub use dataset::{
    DEFAULT_SPLIT_SEED, DEFAULT_TEST_RATIO, MIN_ROWS_FOR_HOLDOUT, Split, TrainTestSplit,
    train_test_split,
};
pub use error::{ModelError, Result};
pub use regression::{EIGENVALUE_RTOL, LinearRegression, r2_score};
