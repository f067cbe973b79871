//! Coefficients command - prints the parameters of the trained model.

use std::path::Path;

use anyhow::{Context, Result};
use wait_model::ModelArtifact;

/// Runs the coefficients command.
///
/// # Errors
///
/// Returns an error if the artifact cannot be loaded.
pub fn run(model_path: &Path) -> Result<()> {
    let artifact = ModelArtifact::load(model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

    print!("{}", render(&artifact));

    Ok(())
}

/// Formats intercept and per-feature coefficients in stored feature order.
#[must_use]
pub fn render(artifact: &ModelArtifact) -> String {
    let metrics = &artifact.metrics;
    let evaluation = if metrics.held_out {
        ""
    } else {
        ", scored on training data"
    };

    let mut lines = vec![
        format!(
            "Model format v{}, trained {}",
            artifact.format_version,
            artifact.trained_at.to_rfc3339()
        ),
        format!(
            "R^2 Score: {} ({} training rows, {} evaluation rows{evaluation})",
            metrics.r2, metrics.train_rows, metrics.evaluation_rows
        ),
        format!("Intercept: {}", artifact.intercept),
        "Coefficients:".to_string(),
    ];
    lines.extend(
        artifact
            .named_coefficients()
            .map(|(name, coefficient)| format!("{name}: {coefficient}")),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
