//! Train command - fits the wait-time model on the stored queue history.

use std::path::PathBuf;

use anyhow::{Context, Result};
use database::QueueHistoryStore;
use queue_features::{DEFAULT_NUMERIC_FEATURES, NumericFeature, build_training_matrix};
use tracing::{info, warn};
use wait_model::{
    DEFAULT_SPLIT_SEED, DEFAULT_TEST_RATIO, LinearRegression, ModelArtifact, TrainingMetrics,
    train_test_split,
};

/// Options for a training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Where the artifact is written.
    pub model_path: PathBuf,
    /// Numeric features, in fit order. Indicator columns follow them.
    pub features: Vec<NumericFeature>,
    /// Fraction of rows held out for evaluation.
    pub test_ratio: f64,
    /// Shuffle seed for the split.
    pub seed: u64,
}

impl TrainOptions {
    /// Default options writing to `model_path`.
    #[must_use]
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            features: DEFAULT_NUMERIC_FEATURES.to_vec(),
            test_ratio: DEFAULT_TEST_RATIO,
            seed: DEFAULT_SPLIT_SEED,
        }
    }
}

/// Runs the train command.
///
/// Loads every record, builds the one-hot design matrix, fits on the
/// training split, prints the R² of the evaluation split and saves the
/// artifact.
///
/// # Errors
///
/// Returns an error if loading, feature extraction, fitting or saving fails.
pub async fn run(store: &impl QueueHistoryStore, options: &TrainOptions) -> Result<ModelArtifact> {
    info!(
        model_path = %options.model_path.display(),
        features = ?options.features,
        "Starting training"
    );

    // Load training data from database
    let records = store
        .list_all()
        .await
        .context("Failed to load queue history")?;
    info!(records = records.len(), "Loaded queue history");

    let matrix = build_training_matrix(&records, &options.features)
        .context("Failed to build training features")?;

    if matrix.dropped_rows > 0 {
        warn!(
            dropped = matrix.dropped_rows,
            "Dropped rows with missing values"
        );
    }

    let split = train_test_split(
        matrix.features.view(),
        matrix.targets.view(),
        options.test_ratio,
        options.seed,
    );

    if !split.held_out {
        warn!(
            rows = matrix.len(),
            "Too few rows to hold out an evaluation set; scoring on training data"
        );
    }

    let model = LinearRegression::fit(split.train.features.view(), split.train.targets.view())
        .context("Failed to fit linear regression")?;

    let r2 = model
        .score(split.test.features.view(), split.test.targets.view())
        .context("Failed to score model")?;

    println!("R^2 Score: {r2}");

    let metrics = TrainingMetrics {
        r2,
        train_rows: split.train.len(),
        evaluation_rows: split.test.len(),
        held_out: split.held_out,
    };

    let artifact = ModelArtifact::new(&model, matrix.feature_names, metrics)?;
    artifact
        .save(&options.model_path)
        .with_context(|| format!("Failed to save model to {}", options.model_path.display()))?;

    info!(
        features = artifact.feature_names.len(),
        r2,
        "Training complete"
    );

    Ok(artifact)
}
