//! Feature extraction for the wait-time model.
//!
//! This crate turns raw queue history records into an ML-ready design
//! matrix: incomplete rows are dropped, the categorical queue name is
//! one-hot encoded, and the resulting column names are kept in the exact
//! order they were fed to the regression. The same ordering is used to
//! align prediction inputs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use database::QueueHistory;
use ndarray::{Array1, Array2};
use tracing::debug;

/// Name of the label column.
pub const LABEL_COLUMN: &str = "waitTime";

/// Name of the categorical column that gets one-hot encoded.
pub const CATEGORY_COLUMN: &str = "queueName";

/// Prefix of generated indicator columns, e.g. `queueName_deposit`.
pub const INDICATOR_PREFIX: &str = "queueName_";

/// Numeric features selected by default, in fit order.
pub const DEFAULT_NUMERIC_FEATURES: [NumericFeature; 4] = [
    NumericFeature::QueueLength,
    NumericFeature::DayOfWeek,
    NumericFeature::HourOfDay,
    NumericFeature::MinuteOfDay,
];

/// Errors raised while building or aligning feature rows.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeatureError {
    /// No record in the source data carries this column.
    #[error("column `{0}` is missing from the source data")]
    MissingColumn(String),

    /// Nothing left to fit after cleaning.
    #[error("no complete rows available for training")]
    EmptyDataset,

    /// A named prediction input lacks a value for a stored feature.
    #[error("no value supplied for feature `{0}`")]
    MissingFeature(String),

    /// A named prediction input refers to a feature the model never saw.
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    /// A queue name with no indicator column in the model.
    #[error("queue `{0}` was not present when the model was trained")]
    UnknownCategory(String),

    /// A feature list entry that names no numeric feature.
    #[error("`{0}` is not a numeric feature (expected one of queueLength, dayOfWeek, hourOfDay, minuteOfDay)")]
    InvalidFeatureName(String),
}

/// Numeric columns of a queue history record usable as features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericFeature {
    QueueLength,
    DayOfWeek,
    HourOfDay,
    MinuteOfDay,
}

impl NumericFeature {
    /// Column name as it appears in stored documents and feature lists.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::QueueLength => "queueLength",
            Self::DayOfWeek => "dayOfWeek",
            Self::HourOfDay => "hourOfDay",
            Self::MinuteOfDay => "minuteOfDay",
        }
    }

    /// Reads this feature from a record.
    #[must_use]
    pub fn value(self, record: &QueueHistory) -> Option<f64> {
        let value = match self {
            Self::QueueLength => record.queue_length,
            Self::DayOfWeek => record.day_of_week,
            Self::HourOfDay => record.hour_of_day,
            Self::MinuteOfDay => record.minute_of_day,
        };
        value.map(f64::from)
    }
}

impl fmt::Display for NumericFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericFeature {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "queueLength" => Ok(Self::QueueLength),
            "dayOfWeek" => Ok(Self::DayOfWeek),
            "hourOfDay" => Ok(Self::HourOfDay),
            "minuteOfDay" => Ok(Self::MinuteOfDay),
            other => Err(FeatureError::InvalidFeatureName(other.to_string())),
        }
    }
}

/// Parses a comma-separated feature list such as `queueLength,hourOfDay`.
///
/// # Errors
///
/// Returns [`FeatureError::InvalidFeatureName`] for an unrecognized entry.
pub fn parse_feature_list(list: &str) -> Result<Vec<NumericFeature>, FeatureError> {
    list.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Returns the indicator column name for a queue category.
#[must_use]
pub fn indicator_name(category: &str) -> String {
    format!("{INDICATOR_PREFIX}{category}")
}

/// Design matrix ready for fitting.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Column names, in the same order as the columns of `features`.
    pub feature_names: Vec<String>,
    /// One row per complete record.
    pub features: Array2<f64>,
    /// Wait time of each row.
    pub targets: Array1<f64>,
    /// Rows discarded because a selected column was missing.
    pub dropped_rows: usize,
}

impl FeatureMatrix {
    /// Number of usable rows.
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

/// A record reduced to the selected columns, with nothing missing.
struct CleanRow<'a> {
    category: &'a str,
    numeric: Vec<f64>,
    target: f64,
}

/// Builds the training design matrix from raw records.
///
/// Columns are the selected numeric features in the given order followed by
/// one indicator per distinct queue name, sorted lexicographically.
///
/// # Errors
///
/// - [`FeatureError::MissingColumn`] if no record carries the label, the
///   queue name, or one of the selected numeric features.
/// - [`FeatureError::EmptyDataset`] if no complete row remains.
pub fn build_training_matrix(
    records: &[QueueHistory],
    numeric: &[NumericFeature],
) -> Result<FeatureMatrix, FeatureError> {
    if records.is_empty() {
        return Err(FeatureError::EmptyDataset);
    }

    ensure_columns_present(records, numeric)?;

    let rows: Vec<CleanRow<'_>> = records
        .iter()
        .filter_map(|record| clean_row(record, numeric))
        .collect();

    let dropped_rows = records.len() - rows.len();
    if rows.is_empty() {
        return Err(FeatureError::EmptyDataset);
    }

    let categories: Vec<&str> = rows
        .iter()
        .map(|row| row.category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let feature_names: Vec<String> = numeric
        .iter()
        .map(|feature| feature.name().to_string())
        .chain(categories.iter().map(|category| indicator_name(category)))
        .collect();

    let width = feature_names.len();
    let mut features = Array2::<f64>::zeros((rows.len(), width));
    let mut targets = Array1::<f64>::zeros(rows.len());

    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.numeric.iter().enumerate() {
            features[[i, j]] = *value;
        }
        if let Ok(position) = categories.binary_search(&row.category) {
            features[[i, numeric.len() + position]] = 1.0;
        }
        targets[i] = row.target;
    }

    debug!(
        rows = rows.len(),
        dropped_rows,
        columns = width,
        categories = categories.len(),
        "Built feature matrix"
    );

    Ok(FeatureMatrix {
        feature_names,
        features,
        targets,
        dropped_rows,
    })
}

/// A column exists when at least one record carries a value for it.
fn ensure_columns_present(
    records: &[QueueHistory],
    numeric: &[NumericFeature],
) -> Result<(), FeatureError> {
    if records.iter().all(|r| r.queue_name.trim().is_empty()) {
        return Err(FeatureError::MissingColumn(CATEGORY_COLUMN.to_string()));
    }

    if records.iter().all(|r| r.wait_time.is_none()) {
        return Err(FeatureError::MissingColumn(LABEL_COLUMN.to_string()));
    }

    for feature in numeric {
        if records.iter().all(|r| feature.value(r).is_none()) {
            return Err(FeatureError::MissingColumn(feature.name().to_string()));
        }
    }

    Ok(())
}

fn clean_row<'a>(record: &'a QueueHistory, numeric: &[NumericFeature]) -> Option<CleanRow<'a>> {
    let category = record.queue_name.trim();
    if category.is_empty() {
        return None;
    }

    let target = record.wait_time.filter(|w| w.is_finite())?;
    let numeric = numeric
        .iter()
        .map(|feature| feature.value(record))
        .collect::<Option<Vec<f64>>>()?;

    Some(CleanRow {
        category,
        numeric,
        target,
    })
}

/// Aligns named prediction inputs into the stored feature order.
///
/// `values` may name any stored column, indicator columns included. When
/// `queue_name` is given, every indicator column is derived from it and
/// indicator entries in `values` are ignored.
///
/// # Errors
///
/// - [`FeatureError::UnknownFeature`] if `values` names a column the model
///   does not have.
/// - [`FeatureError::UnknownCategory`] if `queue_name` has no indicator.
/// - [`FeatureError::MissingFeature`] if a stored column receives no value.
pub fn align_named_features(
    feature_names: &[String],
    values: &BTreeMap<String, f64>,
    queue_name: Option<&str>,
) -> Result<Vec<f64>, FeatureError> {
    if let Some(unknown) = values.keys().find(|name| !feature_names.contains(name)) {
        return Err(FeatureError::UnknownFeature(unknown.clone()));
    }

    if let Some(category) = queue_name {
        let indicator = indicator_name(category.trim());
        if !feature_names.contains(&indicator) {
            return Err(FeatureError::UnknownCategory(category.to_string()));
        }
    }

    feature_names
        .iter()
        .map(|name| match (name.strip_prefix(INDICATOR_PREFIX), queue_name) {
            (Some(category), Some(selected)) => {
                Ok(if category == selected.trim() { 1.0 } else { 0.0 })
            }
            _ => values
                .get(name)
                .copied()
                .ok_or_else(|| FeatureError::MissingFeature(name.clone())),
        })
        .collect()
}
