//! FeedLab Core — OHLCV price feeds from headerless CSV files.
//!
//! - Column mapping: validated field → column-index layouts
//! - CSV loading into a polars table with a unified `datetime` column
//! - `Feed`: the loaded series with per-field column accessors
//! - TOML-loadable read options with MT4 export defaults

pub mod data;
pub mod feed;

pub use data::{
    ColumnLayout, ColumnMapping, ConfigError, CsvLoader, CsvOptions, FeedError, Field,
    ParseError, SchemaError, SkipRows, SourceError,
};
pub use feed::{Bar, Feed, SourceKind};
