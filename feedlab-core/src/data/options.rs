//! Read options for CSV feeds, loadable from TOML.
//!
//! Every recognized option is a field of [`CsvOptions`]; unknown keys in a
//! config file are rejected instead of being passed through.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use super::columns::{ColumnLayout, ColumnMapping};
use super::error::ConfigError;

/// Rows to drop before parsing.
///
/// Rows are zero-based physical line numbers, the same numbering used in
/// parse error messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SkipRows {
    /// Skip the first `n` lines.
    Count(usize),
    /// Skip exactly these lines.
    Indices(BTreeSet<usize>),
}

impl SkipRows {
    pub fn skips(&self, row: usize) -> bool {
        match self {
            SkipRows::Count(n) => row < *n,
            SkipRows::Indices(rows) => rows.contains(&row),
        }
    }
}

/// Options for reading a headerless OHLCV CSV file.
///
/// ```toml
/// delimiter = ";"
/// skip_rows = [0, 3]
/// date_format = "%Y-%m-%d"
/// time_format = "%H:%M:%S"
///
/// [columns]
/// adj_close = 7
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvOptions {
    /// Field separator, default `,`.
    pub delimiter: char,
    /// Leading or selected rows to ignore.
    pub skip_rows: Option<SkipRows>,
    /// strftime format of the date column, default `%Y.%m.%d`.
    pub date_format: String,
    /// strftime format of the time column, default `%H:%M`. Without a date
    /// column this must describe the whole timestamp.
    pub time_format: String,
    pub columns: ColumnLayout,
}

impl CsvOptions {
    /// MetaTrader 4 history export: `2024.01.02,09:30,o,h,l,c,v`.
    pub fn mt4() -> Self {
        Self {
            delimiter: ',',
            skip_rows: None,
            date_format: "%Y.%m.%d".into(),
            time_format: "%H:%M".into(),
            columns: ColumnLayout::mt4(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter {
            '\n' | '\r' => Err(ConfigError::InvalidDelimiter(self.delimiter)),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(ConfigError::InvalidDelimiter(c)),
        }
    }

    /// Validate the column layout against the configured formats.
    pub fn column_mapping(&self) -> Result<ColumnMapping, ConfigError> {
        ColumnMapping::new(&self.columns, &self.date_format, &self.time_format)
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::mt4()
    }
}
