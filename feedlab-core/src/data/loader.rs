use std::fs::File;
use std::path::Path;

use polars::prelude::{Column, DataFrame};

use super::columns::{ColumnMapping, Field};
use super::error::{ConfigError, FeedError, ParseError, SourceError};
use super::options::{CsvOptions, SkipRows};
use super::schema::FeedSchema;
use super::timestamp;

/// Reader for headerless OHLCV CSV files.
///
/// Holds a validated column mapping, so constructing a loader is where
/// configuration errors surface; `load` only fails on the source or its data.
pub struct CsvLoader {
    mapping: ColumnMapping,
    delimiter: u8,
    skip_rows: Option<SkipRows>,
    date_format: String,
    time_format: String,
}

impl CsvLoader {
    pub fn new(options: &CsvOptions) -> Result<Self, FeedError> {
        let mapping = options.column_mapping()?;
        Self::with_mapping(mapping, options).map_err(Into::into)
    }

    /// Use an already validated mapping; only the delimiter is checked here.
    pub fn with_mapping(
        mapping: ColumnMapping,
        options: &CsvOptions,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            mapping,
            delimiter: options.delimiter_byte()?,
            skip_rows: options.skip_rows.clone(),
            date_format: options.date_format.clone(),
            time_format: options.time_format.clone(),
        })
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Format the `datetime` cells are parsed with.
    pub fn timestamp_format(&self) -> String {
        if self.mapping.merges_date() {
            timestamp::combined_format(&self.date_format, &self.time_format)
        } else {
            self.time_format.clone()
        }
    }

    /// Read `path` into a feed table.
    ///
    /// The returned frame has `datetime` as `Datetime(ms)` followed by the
    /// numeric fields as `Float64`; a date column is folded into `datetime`.
    pub fn load(&self, path: &Path) -> Result<DataFrame, FeedError> {
        check_source(path)?;

        tracing::debug!(
            path = %path.display(),
            columns = ?self.mapping.field_names(),
            merge_date = self.mapping.merges_date(),
            "loading CSV feed"
        );

        let file = File::open(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let df = self.read(file)?;

        tracing::info!(path = %path.display(), rows = df.height(), "loaded CSV feed");
        Ok(df)
    }

    /// Parse CSV records from any reader into a feed table.
    pub fn read<R: std::io::Read>(&self, input: R) -> Result<DataFrame, FeedError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let width = self.mapping.width();
        let format = self.timestamp_format();
        let time_pos = self.position(Field::Datetime);
        let date_pos = self.mapping.position(Field::Date);
        let numeric: Vec<(Field, usize)> = FeedSchema::columns(self.mapping.has_adj_close())
            .into_iter()
            .map(|(field, _)| field)
            .filter(|field| field.is_numeric())
            .map(|field| (field, self.position(field)))
            .collect();

        let mut datetimes: Vec<i64> = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); numeric.len()];

        for (i, result) in reader.records().enumerate() {
            let record = result.map_err(ParseError::from)?;
            // csv skips blank lines, so take the row from the record position.
            let row = record
                .position()
                .map_or(i, |pos| pos.line().saturating_sub(1) as usize);

            if self.skip_rows.as_ref().is_some_and(|skip| skip.skips(row)) {
                continue;
            }
            if record.len() != width {
                return Err(ParseError::FieldCount {
                    row,
                    expected: width,
                    found: record.len(),
                }
                .into());
            }

            let raw_time = &record[time_pos];
            let parsed = match date_pos {
                Some(date_pos) => {
                    let combined = format!("{} {}", &record[date_pos], raw_time);
                    timestamp::parse_timestamp(&combined, &format).ok_or_else(|| {
                        ParseError::InvalidTimestamp {
                            row,
                            value: combined,
                            format: format.clone(),
                        }
                    })?
                }
                None => timestamp::parse_timestamp(raw_time, &format).ok_or_else(|| {
                    ParseError::InvalidTimestamp {
                        row,
                        value: raw_time.to_string(),
                        format: format.clone(),
                    }
                })?,
            };
            datetimes.push(timestamp::to_millis(parsed));

            for ((field, pos), column) in numeric.iter().zip(values.iter_mut()) {
                let raw = &record[*pos];
                let value = raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    row,
                    field: field.as_str(),
                    value: raw.to_string(),
                })?;
                column.push(value);
            }
        }

        let mut columns = Vec::with_capacity(numeric.len() + 1);
        columns.push(
            Column::new(Field::Datetime.as_str().into(), datetimes)
                .cast(&FeedSchema::datetime_dtype())?,
        );
        for ((field, _), column) in numeric.iter().zip(values) {
            columns.push(Column::new(field.as_str().into(), column));
        }

        let df = DataFrame::new(columns)?;
        FeedSchema::validate(&df, self.mapping.has_adj_close())?;
        Ok(df)
    }

    fn position(&self, field: Field) -> usize {
        // Every field except Date and AdjClose is always mapped.
        self.mapping.position(field).unwrap_or_default()
    }
}

/// Reject empty, missing and non-file paths before touching the file.
pub fn check_source(path: &Path) -> Result<(), SourceError> {
    if path.as_os_str().is_empty() {
        return Err(SourceError::EmptySourcePath);
    }
    if !path.exists() {
        return Err(SourceError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(SourceError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}
