//! Ordinary least squares with an intercept.
//!
//! Columns are centered and scaled to unit norm before solving the
//! normal equations through a symmetric eigendecomposition. Directions whose
//! eigenvalue falls below [`EIGENVALUE_RTOL`] times the largest one are
//! discarded, which yields the minimum-norm solution for rank-deficient
//! designs such as a full set of one-hot indicators plus an intercept.

use linfa_linalg::eigh::Eigh;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::debug;

use crate::error::{ModelError, Result};

/// Relative eigenvalue cutoff for the pseudo-inverse.
pub const EIGENVALUE_RTOL: f64 = 1e-10;

/// A fitted linear model `y = intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl LinearRegression {
    /// Builds a model from known parameters.
    #[must_use]
    pub fn from_parts(intercept: f64, coefficients: Array1<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Fits the model to `features` (one row per sample) and `targets`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are empty or disagree in length, or if
    /// the eigendecomposition fails.
    pub fn fit(features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>) -> Result<Self> {
        let (rows, cols) = features.dim();
        if rows == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if targets.len() != rows {
            return Err(ModelError::RowMismatch {
                rows,
                targets: targets.len(),
            });
        }

        let x_mean = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(cols));
        let y_mean = targets.mean().unwrap_or(0.0);

        let centered = &features - &x_mean;
        let centered_targets = &targets - y_mean;

        // A column is constant when its spread is within rounding error of
        // its magnitude. Constant columns carry nothing beyond the intercept.
        let scale = centered.map_axis(Axis(0), |column| column.dot(&column).sqrt());
        let magnitude = features.map_axis(Axis(0), |column| {
            column.iter().fold(0.0_f64, |max, value| max.max(value.abs()))
        });
        let tolerance = f64::EPSILON * rows as f64;
        let active: Vec<usize> = (0..cols)
            .filter(|&j| scale[j] > tolerance * magnitude[j])
            .collect();

        let mut coefficients = Array1::<f64>::zeros(cols);

        if !active.is_empty() {
            let mut design = centered.select(Axis(1), &active);
            for (k, &j) in active.iter().enumerate() {
                design.column_mut(k).mapv_inplace(|v| v / scale[j]);
            }

            let solution = solve_min_norm(&design, &centered_targets)?;
            for (k, &j) in active.iter().enumerate() {
                coefficients[j] = solution[k] / scale[j];
            }
        }

        let intercept = y_mean - x_mean.dot(&coefficients);

        debug!(
            rows,
            cols,
            active = active.len(),
            intercept,
            "Fitted linear regression"
        );

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    /// The fitted intercept.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// The fitted coefficients, one per feature column.
    #[must_use]
    pub const fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Number of features the model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predicts one value per row of `features`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if the column count differs
    /// from the number of fitted features.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if features.ncols() != self.n_features() {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features(),
                actual: features.ncols(),
            });
        }

        Ok(features.dot(&self.coefficients) + self.intercept)
    }

    /// Predicts a single feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if the vector length differs
    /// from the number of fitted features.
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features() {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        Ok(self.intercept + ArrayView1::from(features).dot(&self.coefficients))
    }

    /// Coefficient of determination of the predictions on `features`.
    ///
    /// # Errors
    ///
    /// Returns an error on empty input or a shape mismatch.
    pub fn score(
        &self,
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
    ) -> Result<f64> {
        if features.nrows() != targets.len() {
            return Err(ModelError::RowMismatch {
                rows: features.nrows(),
                targets: targets.len(),
            });
        }
        let predictions = self.predict(features)?;
        r2_score(targets, predictions.view())
    }
}

/// Minimum-norm least-squares solution of `design · b = targets`.
fn solve_min_norm(design: &Array2<f64>, targets: &Array1<f64>) -> Result<Array1<f64>> {
    let gram = design.t().dot(design);
    let rhs = design.t().dot(targets);

    let (eigenvalues, eigenvectors) = gram.eigh()?;

    let largest = eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = largest * EIGENVALUE_RTOL;

    let mut solution = Array1::<f64>::zeros(design.ncols());
    for (i, &lambda) in eigenvalues.iter().enumerate() {
        if lambda <= cutoff {
            continue;
        }
        let direction = eigenvectors.column(i);
        let weight = direction.dot(&rhs) / lambda;
        solution.scaled_add(weight, &direction);
    }

    Ok(solution)
}

/// Coefficient of determination.
///
/// When the targets are constant the score is 1.0 for a perfect fit and
/// 0.0 otherwise.
///
/// # Errors
///
/// Returns an error if the inputs are empty or disagree in length.
pub fn r2_score(targets: ArrayView1<'_, f64>, predictions: ArrayView1<'_, f64>) -> Result<f64> {
    if targets.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    if targets.len() != predictions.len() {
        return Err(ModelError::ShapeMismatch {
            expected: targets.len(),
            actual: predictions.len(),
        });
    }

    let mean = targets.mean().unwrap_or(0.0);
    let ss_res: f64 = targets
        .iter()
        .zip(predictions.iter())
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    let ss_tot: f64 = targets.iter().map(|y| (y - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_fits_exact_line() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let model = LinearRegression::fit(x.view(), y.view()).unwrap();

        assert!((model.intercept() - 1.0).abs() < 1e-9);
        assert!((model.coefficients()[0] - 2.0).abs() < 1e-9);
        assert!((model.score(x.view(), y.view()).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fits_two_features() {
        // y = 4 + 1.5 a - 2 b
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 3.0], [5.0, 1.0], [3.0, 4.0]];
        let y = x.map_axis(Axis(1), |row| 4.0 + 1.5 * row[0] - 2.0 * row[1]);

        let model = LinearRegression::fit(x.view(), y.view()).unwrap();

        assert!((model.intercept() - 4.0).abs() < 1e-8);
        assert!((model.coefficients()[0] - 1.5).abs() < 1e-8);
        assert!((model.coefficients()[1] + 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_rank_deficient_one_hot_design() {
        // Both indicator columns always sum to one, so together with the
        // intercept the design is singular.
        let x = array![
            [3.0, 1.0, 0.0],
            [2.0, 0.0, 1.0],
            [5.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
        ];
        let y = array![13.0, 6.0, 19.0, 3.0];

        let model = LinearRegression::fit(x.view(), y.view()).unwrap();
        let predictions = model.predict(x.view()).unwrap();

        for (p, t) in predictions.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8, "prediction {p} != target {t}");
        }
        assert!(model.coefficients().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let y = array![2.0, 4.0, 6.0];

        let model = LinearRegression::fit(x.view(), y.view()).unwrap();

        assert_eq!(model.coefficients()[1], 0.0);
        assert!((model.predict_one(&[4.0, 7.0]).unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_scale_column_is_fitted() {
        let x = array![[1e-20, 0.1], [2e-20, 0.1], [3e-20, 0.1]];
        let y = array![2.0, 4.0, 6.0];

        let model = LinearRegression::fit(x.view(), y.view()).unwrap();

        let slope = model.coefficients()[0];
        assert!(((slope - 2e20) / 2e20).abs() < 1e-9, "slope {slope}");
        assert_eq!(model.coefficients()[1], 0.0);
        assert!((model.predict_one(&[4e-20, 0.1]).unwrap() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = LinearRegression::from_parts(1.0, array![1.0, 2.0, 3.0]);

        assert!(matches!(
            model.predict_one(&[1.0, 2.0]),
            Err(ModelError::ShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            model.predict_one(&[1.0, 2.0, 3.0, 4.0]),
            Err(ModelError::ShapeMismatch {
                expected: 3,
                actual: 4
            })
        ));
        assert!(matches!(
            model.predict(array![[1.0, 2.0]].view()),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_predictions_are_deterministic() {
        let model = LinearRegression::from_parts(0.5, array![0.1, -0.2, 3.0]);
        let input = [2.0, 4.0, 1.0];

        let first = model.predict_one(&input).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict_one(&input).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            LinearRegression::fit(empty.view(), Array1::<f64>::zeros(0).view()),
            Err(ModelError::EmptyDataset)
        ));

        let x = array![[1.0], [2.0]];
        assert!(matches!(
            LinearRegression::fit(x.view(), array![1.0].view()),
            Err(ModelError::RowMismatch { rows: 2, targets: 1 })
        ));
    }

    #[test]
    fn test_r2_score() {
        let y = array![1.0, 2.0, 3.0];
        assert!((r2_score(y.view(), y.view()).unwrap() - 1.0).abs() < f64::EPSILON);

        let mean_only = array![2.0, 2.0, 2.0];
        assert!(r2_score(y.view(), mean_only.view()).unwrap().abs() < f64::EPSILON);

        let constant = array![5.0, 5.0];
        assert_eq!(r2_score(constant.view(), constant.view()).unwrap(), 1.0);
        assert_eq!(r2_score(constant.view(), array![5.0, 6.0].view()).unwrap(), 0.0);
    }
}
