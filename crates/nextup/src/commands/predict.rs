//! Predict command - estimates a wait time from a feature vector.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use queue_features::align_named_features;
use serde::Deserialize;
use tracing::{debug, info};
use wait_model::ModelArtifact;

/// Feature input accepted on the command line.
///
/// Either a JSON array in stored feature order, or a JSON object keyed by
/// feature name with an optional `queueName` that sets the indicators.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FeatureInput {
    Ordered(Vec<f64>),
    Named {
        #[serde(rename = "queueName", default)]
        queue_name: Option<String>,
        #[serde(flatten)]
        values: BTreeMap<String, f64>,
    },
}

impl FeatureInput {
    /// Parses the command-line argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is neither a numeric array nor an
    /// object of numeric features.
    pub fn parse(input: &str) -> Result<Self> {
        serde_json::from_str(input).with_context(|| {
            format!("Expected a JSON array of numbers or an object of named features, got: {input}")
        })
    }

    /// Produces the feature vector in the artifact's stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if named inputs do not cover the stored features.
    pub fn align(self, artifact: &ModelArtifact) -> Result<Vec<f64>> {
        match self {
            Self::Ordered(values) => Ok(values),
            Self::Named { queue_name, values } => Ok(align_named_features(
                &artifact.feature_names,
                &values,
                queue_name.as_deref(),
            )?),
        }
    }
}

/// Runs the predict command and returns the estimated wait time.
///
/// # Errors
///
/// Returns an error if the artifact cannot be loaded, the input cannot be
/// parsed, or its length does not match the stored feature list.
pub fn run(model_path: &Path, input: &str) -> Result<f64> {
    let artifact = ModelArtifact::load(model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

    let features = FeatureInput::parse(input)?.align(&artifact)?;
    debug!(?features, names = ?artifact.feature_names, "Aligned feature vector");

    let prediction = artifact.predict(&features)?;
    info!(prediction, "Predicted wait time");

    Ok(prediction)
}
