use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::features::LABEL_COLUMN;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{ids} identifiers but {probabilities} probabilities")]
    LengthMismatch { ids: usize, probabilities: usize },
    #[error("probability {probability} for id {id} is outside [0, 1]")]
    InvalidProbability { id: String, probability: f64 },
    #[error("failed to write submission {}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode submission {}", .path.display())]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    #[error("failed to format submission timestamp")]
    Timestamp(#[from] time::error::Format),
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Test-row identifiers paired with the predicted probability of `OpenStatus = 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    ids: Vec<String>,
    probabilities: Vec<f64>,
}

impl Submission {
    pub fn new(ids: Vec<String>, probabilities: Vec<f64>) -> SubmissionResult<Self> {
        if ids.len() != probabilities.len() {
            return Err(SubmissionError::LengthMismatch {
                ids: ids.len(),
                probabilities: probabilities.len(),
            });
        }
        if let Some((id, &probability)) = ids
            .iter()
            .zip(&probabilities)
            .find(|(_, probability)| !(0.0..=1.0).contains(*probability))
        {
            return Err(SubmissionError::InvalidProbability {
                id: id.clone(),
                probability,
            });
        }
        Ok(Self { ids, probabilities })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Writes an `id,OpenStatus` CSV, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> SubmissionResult<()> {
        info!("Saving predictions in {}...", path.display());
        let io_err = |source| SubmissionError::Io {
            path: path.to_path_buf(),
            source,
        };
        let csv_err = |source| SubmissionError::Csv {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let file = File::create(path).map_err(io_err)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(["id", LABEL_COLUMN]).map_err(csv_err)?;
        for (id, probability) in self.ids.iter().zip(&self.probabilities) {
            writer
                .write_record([id.as_str(), probability.to_string().as_str()])
                .map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

/// `submission_YYMMDD_HHMMSS.csv` for the given moment.
pub fn submission_file_name(at: OffsetDateTime) -> SubmissionResult<String> {
    let stamp = at.format(format_description!(
        "[year repr:last_two][month][day]_[hour][minute][second]"
    ))?;
    Ok(format!("submission_{stamp}.csv"))
}

/// Timestamped submission path inside `dir`.
pub fn submission_path(dir: &Path, at: OffsetDateTime) -> SubmissionResult<PathBuf> {
    Ok(dir.join(submission_file_name(at)?))
}

/// Local wall-clock time, or UTC when the local offset cannot be determined.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
