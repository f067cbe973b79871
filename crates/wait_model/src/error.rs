//! Error types for the wait-time model crate.

use std::path::PathBuf;

/// Errors raised while fitting, evaluating, saving or loading a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Input width does not match the number of fitted features.
    #[error("expected {expected} feature values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Feature matrix and targets disagree on the number of rows.
    #[error("feature matrix has {rows} rows but {targets} targets were supplied")]
    RowMismatch { rows: usize, targets: usize },

    /// Nothing to fit or score.
    #[error("cannot fit or score on an empty dataset")]
    EmptyDataset,

    /// Feature names and coefficients disagree in length.
    #[error("artifact lists {names} feature names but {coefficients} coefficients")]
    FeatureNamesMismatch { names: usize, coefficients: usize },

    /// Artifact written by an incompatible version of this tool.
    #[error("unsupported model artifact version {found} (supported: {supported})")]
    UnsupportedArtifactVersion { found: u32, supported: u32 },

    /// Numerical failure in the least-squares solve.
    #[error("linear algebra failure: {0}")]
    Linalg(#[from] linfa_linalg::LinalgError),

    /// Artifact file could not be read or written.
    #[error("model artifact I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact file is not valid JSON for the artifact schema.
    #[error("model artifact is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ModelError>;
