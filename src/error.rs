use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the backing blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode entries: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a user-entered reading was not added. Rejections leave the entries untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputRejection {
    #[error("date is empty")]
    EmptyDate,
    #[error("reading is empty")]
    EmptyReading,
    #[error("reading is not a number")]
    NotANumber,
    #[error("date is not a YYYY-MM-DD calendar date")]
    InvalidDate,
    #[error("reading is negative")]
    NegativeReading,
}

/// Failure importing readings from a CSV file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unexpected CSV headers {found:?}, expected {expected:?}")]
    UnexpectedHeaders {
        found: Vec<String>,
        expected: Vec<String>,
    },
    #[error("failed to read CSV row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
