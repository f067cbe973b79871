//! Persisted model artifact.
//!
//! The artifact bundles the regression parameters with the exact ordered
//! list of feature names used at fit time. It carries an explicit format
//! version so readers never rely on positional layout.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ModelError, Result};
use crate::regression::LinearRegression;

/// Artifact format written by this version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Goodness-of-fit figures recorded at training time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// R² on the evaluation rows.
    pub r2: f64,
    /// Rows the model was fitted on.
    pub train_rows: usize,
    /// Rows the model was scored on.
    pub evaluation_rows: usize,
    /// Whether evaluation rows were held out from fitting.
    pub held_out: bool,
}

/// A fitted wait-time model plus the feature ordering it expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub metrics: TrainingMetrics,
}

impl ModelArtifact {
    /// Bundles a fitted model with its feature names.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::FeatureNamesMismatch`] if the number of names
    /// differs from the number of coefficients.
    pub fn new(
        model: &LinearRegression,
        feature_names: Vec<String>,
        metrics: TrainingMetrics,
    ) -> Result<Self> {
        let artifact = Self {
            format_version: ARTIFACT_VERSION,
            trained_at: Utc::now(),
            feature_names,
            intercept: model.intercept(),
            coefficients: model.coefficients().to_vec(),
            metrics,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_VERSION {
            return Err(ModelError::UnsupportedArtifactVersion {
                found: self.format_version,
                supported: ARTIFACT_VERSION,
            });
        }
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ModelError::FeatureNamesMismatch {
                names: self.feature_names.len(),
                coefficients: self.coefficients.len(),
            });
        }
        Ok(())
    }

    /// Rebuilds the regression model.
    #[must_use]
    pub fn model(&self) -> LinearRegression {
        LinearRegression::from_parts(self.intercept, Array1::from(self.coefficients.clone()))
    }

    /// Predicts a feature vector given in stored feature order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if the vector length differs
    /// from the number of stored feature names.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: features.len(),
            });
        }
        self.model().predict_one(features)
    }

    /// Pairs each feature name with its coefficient, in stored order.
    pub fn named_coefficients(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.feature_names
            .iter()
            .map(String::as_str)
            .zip(self.coefficients.iter().copied())
    }

    /// Writes the artifact as JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| io_error(path, source))?;

        info!(
            path = %path.display(),
            features = self.feature_names.len(),
            "Saved model artifact"
        );

        Ok(())
    }

    /// Reads and validates an artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, was written
    /// with another format version, or lists a different number of feature
    /// names than coefficients.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        let artifact: Self = serde_json::from_str(&data)?;
        artifact.validate()?;
        Ok(artifact)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ModelError {
    ModelError::Io {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn metrics() -> TrainingMetrics {
        TrainingMetrics {
            r2: 0.9,
            train_rows: 8,
            evaluation_rows: 2,
            held_out: true,
        }
    }

    fn artifact() -> ModelArtifact {
        let model = LinearRegression::from_parts(2.0, array![1.0, 0.5, -1.0]);
        let names = vec![
            "queueLength".to_string(),
            "queueName_deposit".to_string(),
            "queueName_withdrawal".to_string(),
        ];
        ModelArtifact::new(&model, names, metrics()).unwrap()
    }

    #[test]
    fn test_save_and_load_preserve_ordering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        let saved = artifact();
        saved.save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(
            loaded.named_coefficients().collect::<Vec<_>>(),
            vec![
                ("queueLength", 1.0),
                ("queueName_deposit", 0.5),
                ("queueName_withdrawal", -1.0),
            ]
        );
    }

    #[test]
    fn test_new_rejects_mismatched_names() {
        let model = LinearRegression::from_parts(0.0, array![1.0, 2.0]);
        let err =
            ModelArtifact::new(&model, vec!["queueLength".to_string()], metrics()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureNamesMismatch {
                names: 1,
                coefficients: 2
            }
        ));
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut future = artifact();
        future.format_version = ARTIFACT_VERSION + 1;
        fs::write(&path, serde_json::to_string(&future).unwrap()).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelError::UnsupportedArtifactVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_load_rejects_tampered_coefficients() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut broken = artifact();
        broken.coefficients.pop();
        fs::write(&path, serde_json::to_string(&broken).unwrap()).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ModelError::FeatureNamesMismatch { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelArtifact::load(&dir.path().join("absent.json")),
            Err(ModelError::Io { .. })
        ));
    }

    #[test]
    fn test_predict_checks_length() {
        let artifact = artifact();

        assert!((artifact.predict(&[3.0, 1.0, 0.0]).unwrap() - 5.5).abs() < 1e-12);
        assert!(matches!(
            artifact.predict(&[3.0, 1.0]),
            Err(ModelError::ShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            artifact.predict(&[3.0, 1.0, 0.0, 9.0]),
            Err(ModelError::ShapeMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }
}
