use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::table::Table;

/// Errors raised while loading the competition data.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to open {}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed CSV")]
    Csv(#[source] csv::Error),
    #[error("malformed CSV in {}", .path.display())]
    CsvFile {
        path: PathBuf,
        source: csv::Error,
    },
    #[error("CSV input has no header row")]
    EmptyHeader,
    #[error("CSV line {line} has {found} fields but the header has {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("It seems like you have loaded the wrong datasets! Expected {expected}, found {found}")]
    WrongDatasets {
        expected: DatasetShape,
        found: DatasetShape,
    },
}

impl DatasetError {
    pub(crate) fn csv(err: csv::Error) -> Self {
        DatasetError::Csv(err)
    }

    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            DatasetError::Csv(source) => DatasetError::CsvFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Row and column counts that identify one particular train/test pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatasetShape {
    pub train_rows: usize,
    pub test_rows: usize,
    pub columns: usize,
}

impl DatasetShape {
    /// Fingerprint of the closed-questions competition files.
    pub const COMPETITION: DatasetShape = DatasetShape {
        train_rows: 140_272,
        test_rows: 73_290,
        columns: 15,
    };

    pub const fn new(train_rows: usize, test_rows: usize, columns: usize) -> Self {
        Self {
            train_rows,
            test_rows,
            columns,
        }
    }

    /// Fails unless `found` matches this fingerprint exactly.
    pub fn verify(&self, found: DatasetShape) -> DatasetResult<()> {
        if *self == found {
            Ok(())
        } else {
            Err(DatasetError::WrongDatasets {
                expected: *self,
                found,
            })
        }
    }
}

impl Default for DatasetShape {
    fn default() -> Self {
        Self::COMPETITION
    }
}

impl fmt::Display for DatasetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} training rows, {} test rows, {} columns",
            self.train_rows, self.test_rows, self.columns
        )
    }
}

/// Training and test tables plus their concatenation.
#[derive(Clone, Debug)]
pub struct Dataset {
    train: Table,
    test: Table,
    data: Table,
}

impl Dataset {
    /// Loads both files and checks them against `expected`.
    pub fn load(train_file: &Path, test_file: &Path, expected: DatasetShape) -> DatasetResult<Self> {
        info!("Loading {}...", train_file.display());
        let train = Table::read_csv(train_file)?;
        info!("Loading {}...", test_file.display());
        let test = Table::read_csv(test_file)?;
        Self::from_tables(train, test, expected)
    }

    /// Combines already-parsed tables; the training header decides column order.
    pub fn from_tables(train: Table, test: Table, expected: DatasetShape) -> DatasetResult<Self> {
        let found = DatasetShape::new(train.len(), test.len(), train.column_count());
        info!(
            "Loaded {} training samples and {} testing samples",
            found.train_rows, found.test_rows
        );
        expected.verify(found)?;

        let data = train.concat(&test);
        Ok(Self { train, test, data })
    }

    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    pub fn n_test(&self) -> usize {
        self.test.len()
    }

    pub fn train(&self) -> &Table {
        &self.train
    }

    pub fn test(&self) -> &Table {
        &self.test
    }

    /// Training rows followed by test rows.
    pub fn data(&self) -> &Table {
        &self.data
    }

    /// Identifiers of the test rows, in file order.
    pub fn test_ids(&self) -> &[String] {
        self.test.index()
    }
}
