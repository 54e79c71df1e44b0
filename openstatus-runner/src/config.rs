use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use openstatus_core::{DatasetShape, DEFAULT_FEATURES};
use openstatus_ml::{ModelKind, Scoring};

/// Directory holding `train.csv` and `test.csv`; submissions land here too.
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TRAIN_FILE: &str = "train.csv";
pub const DEFAULT_TEST_FILE: &str = "test.csv";
pub const DEFAULT_CV_FOLDS: usize = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub model: ModelSection,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        toml::from_str(&content).context("parse TOML configuration")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.model.cv_folds >= 2,
            "cv_folds must be at least 2, got {}",
            self.model.cv_folds
        );
        ensure!(
            !self.model.features.is_empty(),
            "at least one feature column is required"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSection {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_train_file")]
    pub train_file: String,
    #[serde(default = "default_test_file")]
    pub test_file: String,
    pub expected_train_rows: Option<usize>,
    pub expected_test_rows: Option<usize>,
    pub expected_columns: Option<usize>,
}

impl DataSection {
    pub fn train_path(&self) -> PathBuf {
        self.dir.join(&self.train_file)
    }

    pub fn test_path(&self) -> PathBuf {
        self.dir.join(&self.test_file)
    }

    /// Competition fingerprint with any configured overrides applied.
    pub fn expected_shape(&self) -> DatasetShape {
        let competition = DatasetShape::COMPETITION;
        DatasetShape::new(
            self.expected_train_rows.unwrap_or(competition.train_rows),
            self.expected_test_rows.unwrap_or(competition.test_rows),
            self.expected_columns.unwrap_or(competition.columns),
        )
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            train_file: default_train_file(),
            test_file: default_test_file(),
            expected_train_rows: None,
            expected_test_rows: None,
            expected_columns: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    #[serde(default)]
    pub kind: ModelKind,
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    #[serde(default)]
    pub scoring: Scoring,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            kind: ModelKind::default(),
            features: default_features(),
            cv_folds: default_cv_folds(),
            scoring: Scoring::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_train_file() -> String {
    DEFAULT_TRAIN_FILE.to_string()
}

fn default_test_file() -> String {
    DEFAULT_TEST_FILE.to_string()
}

fn default_features() -> Vec<String> {
    DEFAULT_FEATURES.iter().map(|name| name.to_string()).collect()
}

fn default_cv_folds() -> usize {
    DEFAULT_CV_FOLDS
}
