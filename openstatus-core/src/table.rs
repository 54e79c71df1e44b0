use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, trace};

use crate::{DatasetError, DatasetResult};

/// In-memory CSV table whose first column is kept apart as the row index.
///
/// Cells are stored as raw text; numeric access parses on demand so free-text
/// columns such as `BodyMarkdown` survive untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    index_name: String,
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table from already-split parts.
    ///
    /// Rows shorter than the header are padded with empty (missing) cells.
    pub fn new(
        index_name: impl Into<String>,
        columns: Vec<String>,
        index: Vec<String>,
        mut rows: Vec<Vec<String>>,
    ) -> Self {
        debug_assert_eq!(index.len(), rows.len());
        let width = columns.len();
        for row in rows.iter_mut() {
            row.resize(width, String::new());
        }
        Self {
            index_name: index_name.into(),
            columns,
            index,
            rows,
        }
    }

    /// Reads a CSV file, using its first column as the row index.
    pub fn read_csv(path: &Path) -> DatasetResult<Self> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|err| err.with_path(path))
    }

    /// Parses CSV content from any reader, using its first column as the row index.
    ///
    /// Short records are padded with missing cells; a record with more fields
    /// than the header is rejected.
    pub fn from_reader<R: Read>(reader: R) -> DatasetResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(DatasetError::csv)?.clone();
        let mut header_iter = headers.iter();
        let index_name = header_iter
            .next()
            .ok_or(DatasetError::EmptyHeader)?
            .to_string();
        let columns: Vec<String> = header_iter.map(str::to_string).collect();
        debug!(
            target: "openstatus_core::table",
            "header `{}` + {} columns",
            index_name,
            columns.len()
        );

        let mut index = Vec::new();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(DatasetError::csv)?;
            if record.len() > headers.len() {
                return Err(DatasetError::TooManyFields {
                    line: record.position().map_or(0, |position| position.line()),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let mut fields = record.iter();
            let Some(id) = fields.next() else {
                continue;
            };
            index.push(id.to_string());
            rows.push(fields.map(str::to_string).collect());
        }
        trace!(target: "openstatus_core::table", "parsed {} records", rows.len());

        Ok(Self::new(index_name, columns, index, rows))
    }

    /// Appends `other` below `self`, laid out in `self`'s column order.
    ///
    /// Columns that `other` lacks (the label column of a test file) become
    /// missing cells; columns only `other` has are dropped.
    pub fn concat(&self, other: &Table) -> Table {
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|name| other.column_index(name))
            .collect();

        let mut index = self.index.clone();
        index.extend(other.index.iter().cloned());

        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().map(|row| {
            mapping
                .iter()
                .map(|slot| slot.map(|col| row[col].clone()).unwrap_or_default())
                .collect::<Vec<_>>()
        }));

        Table {
            index_name: self.index_name.clone(),
            columns: self.columns.clone(),
            index,
            rows,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row identifiers in table order.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }

    /// Parses one column as floating point values, mapping missing or
    /// non-numeric cells to NaN.
    pub fn numeric_column(&self, column: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| parse_numeric(&row[column]))
            .collect()
    }
}

/// Parses a single cell; empty, `NA`-style and non-finite cells are missing.
pub fn parse_numeric(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if is_missing(trimmed) {
        return f64::NAN;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => f64::NAN,
    }
}

fn is_missing(cell: &str) -> bool {
    matches!(cell, "" | "NA" | "NaN" | "nan" | "null")
}
