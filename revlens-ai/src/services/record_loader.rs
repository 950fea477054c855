//! Record loader
//!
//! Parses a CSV table (header row required) into a [`ReviewBatch`]. Only the
//! `review` column is read; every row yields exactly one record, with null
//! cells coerced to the text `nan` the way a dataframe string cast does.

use crate::models::{ReviewBatch, ReviewRecord};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Required column name (case-sensitive)
pub const REVIEW_COLUMN: &str = "review";

/// Text substituted for null cells
pub const NULL_TEXT: &str = "nan";

/// Cell values read as null (dataframe default NA markers)
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Record loader errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// Required column missing; the operator must fix the input file
    #[error("Input table must contain a column named '{column}' (found columns: {found})")]
    Schema { column: &'static str, found: String },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the input table comes from
#[derive(Debug, Clone)]
pub enum TableSource {
    /// CSV file on disk
    File(PathBuf),
    /// CSV content already in memory (e.g. an HTTP request body)
    Bytes(Vec<u8>),
}

impl TableSource {
    /// Short description for logs and events
    pub fn describe(&self) -> String {
        match self {
            TableSource::File(path) => path.display().to_string(),
            TableSource::Bytes(bytes) => format!("in-memory table ({} bytes)", bytes.len()),
        }
    }
}

/// Loads review tables
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordLoader;

impl RecordLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, source: &TableSource) -> Result<ReviewBatch, LoadError> {
        match source {
            TableSource::File(path) => self.load_path(path),
            TableSource::Bytes(bytes) => self.load_reader(bytes.as_slice()),
        }
    }

    pub fn load_path(&self, path: &Path) -> Result<ReviewBatch, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let batch = self.load_reader(file)?;
        info!("Loaded {} reviews from {}", batch.len(), path.display());
        Ok(batch)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<ReviewBatch, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column_index = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == REVIEW_COLUMN)
            .ok_or_else(|| LoadError::Schema {
                column: REVIEW_COLUMN,
                found: if headers.is_empty() {
                    "none".to_string()
                } else {
                    headers.iter().collect::<Vec<_>>().join(", ")
                },
            })?;

        debug!(
            column_index,
            columns = headers.len(),
            "Found '{}' column",
            REVIEW_COLUMN
        );

        let mut records = Vec::new();
        for (row_index, row) in csv_reader.records().enumerate() {
            let row = row?;
            let text = coerce_cell(row.get(column_index));
            records.push(ReviewRecord::new(row_index, text));
        }

        Ok(ReviewBatch::new(records))
    }
}

/// String form of a cell; missing and NA cells become [`NULL_TEXT`]
fn coerce_cell(cell: Option<&str>) -> String {
    match cell {
        Some(value) if !is_null_marker(value) => value.to_string(),
        _ => NULL_TEXT.to_string(),
    }
}

fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS.contains(&value)
}
