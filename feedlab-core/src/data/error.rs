//! Structured error types for feed loading.
//!
//! Errors are grouped by the stage that raises them: column configuration,
//! source resolution, record parsing and table assembly. Every failure is
//! returned to the caller of the load; nothing is retried internally.

use std::path::PathBuf;

use polars::prelude::{DataType, PolarsError};
use thiserror::Error;

/// Invalid column layout or read options. Raised before any I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("column {index} is assigned to both '{first}' and '{second}'")]
    DuplicateColumn {
        index: usize,
        first: &'static str,
        second: &'static str,
    },

    #[error("column indices are not consecutive: column {missing} is unassigned")]
    NonContiguousColumns { missing: usize },

    #[error("column indices must start at 0 (lowest assigned index is {min})")]
    MissingColumnZero { min: usize },

    #[error("time column must be set to an index > 0 when no date column is configured")]
    MissingTimeColumn,

    #[error("date format must be specified when a date column is configured")]
    MissingDateFormat,

    #[error("time format must not be empty")]
    MissingTimeFormat,

    #[error("delimiter {0:?} is not a single-byte ASCII character")]
    InvalidDelimiter(char),

    #[error("invalid feed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The input source cannot be used. Raised before any read attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("a CSV file path has to be given")]
    EmptySourcePath,

    #[error("the file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),

    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A record could not be turned into a bar. Rows are zero-based physical
/// line numbers in the source file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("row {row}: cannot parse timestamp {value:?} with format {format:?}")]
    InvalidTimestamp {
        row: usize,
        value: String,
        format: String,
    },

    #[error("row {row}: invalid number {value:?} in column '{field}'")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("row {row}: expected {expected} columns, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// The assembled table does not have the feed's column set.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("unexpected column: {0}")]
    UnexpectedColumn(String),

    #[error("type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

/// Top-level error for feed construction, loading and field access.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("table error: {0}")]
    Table(#[from] PolarsError),

    #[error("no data loaded: the feed has not been loaded from a source yet")]
    NoDataLoaded,
}
