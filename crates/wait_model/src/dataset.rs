//! Train/evaluation split.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Below this many rows the model is scored on the data it was fitted on.
pub const MIN_ROWS_FOR_HOLDOUT: usize = 5;

/// Default fraction of rows held out for evaluation.
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Default shuffle seed.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Rows and targets of one side of a split.
#[derive(Debug, Clone)]
pub struct Split {
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
}

impl Split {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Result of [`train_test_split`].
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Split,
    pub test: Split,
    /// False when the data was too small to hold anything out; `train` and
    /// `test` then both contain every row.
    pub held_out: bool,
}

/// Shuffles rows with a seeded RNG and holds out `ceil(n * test_ratio)` of
/// them for evaluation.
///
/// Falls back to scoring on the training data when fewer than
/// [`MIN_ROWS_FOR_HOLDOUT`] rows exist or the ratio would leave either side
/// empty.
#[must_use]
pub fn train_test_split(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    test_ratio: f64,
    seed: u64,
) -> TrainTestSplit {
    let rows = features.nrows();
    let test_rows = (rows as f64 * test_ratio.clamp(0.0, 1.0)).ceil() as usize;

    if rows < MIN_ROWS_FOR_HOLDOUT || test_rows == 0 || test_rows >= rows {
        let all = Split {
            features: features.to_owned(),
            targets: targets.to_owned(),
        };
        return TrainTestSplit {
            train: all.clone(),
            test: all,
            held_out: false,
        };
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(test_rows);

    TrainTestSplit {
        train: Split {
            features: features.select(Axis(0), train_idx),
            targets: targets.select(Axis(0), train_idx),
        },
        test: Split {
            features: features.select(Axis(0), test_idx),
            targets: targets.select(Axis(0), test_idx),
        },
        held_out: true,
    }
}
