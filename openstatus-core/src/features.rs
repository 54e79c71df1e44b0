use log::debug;
use thiserror::Error;

use crate::table::Table;

/// Data columns of the competition files, after the leading row index.
pub const ALL_COLUMNS: [&str; 15] = [
    "PostId",
    "PostCreationDate",
    "OwnerUserId",
    "OwnerCreationDate",
    "ReputationAtPostCreation",
    "OwnerUndeletedAnswerCountAtPostTime",
    "Title",
    "BodyMarkdown",
    "Tag1",
    "Tag2",
    "Tag3",
    "Tag4",
    "Tag5",
    "PostClosedDate",
    "OpenStatus",
];

pub const DEFAULT_FEATURES: [&str; 3] = [
    "OwnerUserId",
    "ReputationAtPostCreation",
    "OwnerUndeletedAnswerCountAtPostTime",
];

/// Target column; NaN for every test row.
pub const LABEL_COLUMN: &str = "OpenStatus";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("column `{0}` is not present in the data")]
    UnknownColumn(String),
}

pub type FeatureResult<T> = Result<T, FeatureError>;

/// Row-major numeric matrix with named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(names: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == names.len()));
        Self { names, rows }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

/// Label per row; NaN marks a row without a known outcome.
pub type LabelVector = Vec<f64>;

/// Default feature selection: three owner statistics plus `OpenStatus`.
pub fn extract_features(data: &Table) -> FeatureResult<(FeatureMatrix, LabelVector)> {
    extract_columns(data, &DEFAULT_FEATURES, LABEL_COLUMN)
}

/// Selects `features` as the matrix and `label` as the target, in table row order.
pub fn extract_columns<S: AsRef<str>>(
    data: &Table,
    features: &[S],
    label: &str,
) -> FeatureResult<(FeatureMatrix, LabelVector)> {
    let columns = features
        .iter()
        .map(|name| lookup(data, name.as_ref()).map(|index| data.numeric_column(index)))
        .collect::<FeatureResult<Vec<_>>>()?;
    let labels = data.numeric_column(lookup(data, label)?);

    let rows = (0..data.len())
        .map(|row| columns.iter().map(|column| column[row]).collect())
        .collect();
    let names = features
        .iter()
        .map(|name| name.as_ref().to_string())
        .collect();

    debug!(
        target: "openstatus_core::features",
        "extracted {} rows x {} features",
        data.len(),
        features.len()
    );
    Ok((FeatureMatrix::new(names, rows), labels))
}

fn lookup(data: &Table, name: &str) -> FeatureResult<usize> {
    data.column_index(name)
        .ok_or_else(|| FeatureError::UnknownColumn(name.to_string()))
}
