// Source loading errors
// Anything that can go wrong between a path on disk and a table of strings

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file format: '{0}' (expected .csv, .xlsx, .xls, .xlsm or .ods)")]
    UnsupportedFormat(String),

    #[error("Spreadsheet parse failed for {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    #[error("Spreadsheet has no worksheets: {0}")]
    EmptySheet(PathBuf),

    #[error("Required column '{column}' missing from {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;
