//! Competition data handling: CSV tables, the dataset fingerprint, feature
//! selection and submission files.

pub mod dataset;
pub mod features;
pub mod submission;
pub mod table;

pub use dataset::{Dataset, DatasetError, DatasetResult, DatasetShape};
pub use features::{
    extract_columns, extract_features, FeatureError, FeatureMatrix, LabelVector, DEFAULT_FEATURES,
    LABEL_COLUMN,
};
pub use submission::{Submission, SubmissionError};
pub use table::Table;
