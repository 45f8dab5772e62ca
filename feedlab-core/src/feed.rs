//! Feed — one security's OHLCV series, loaded from a source into a table.
//!
//! Construction presets compose a single [`Feed`] type with [`CsvOptions`]:
//! - [`Feed::new`]: generic, loads immediately when file-based with a source
//! - [`Feed::csv`]: caller-chosen column layout
//! - [`Feed::mt4`]: MetaTrader 4 history export layout
//!
//! The table is replaced only after a load fully succeeds, so a failed
//! reload leaves the previous data readable.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use polars::prelude::{Column, DataFrame, DataType};
use serde::{Deserialize, Serialize};

use crate::data::{timestamp, ColumnLayout, CsvLoader, CsvOptions, FeedError, Field, SourceError};

/// Where a feed's data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Delimited text file.
    FileBased,
    /// Live market data. Placeholder: such feeds never load data.
    LiveStream,
}

/// One row of a loaded feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub datetime: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: Option<f64>,
}

/// Price feed for a single security.
#[derive(Debug, Clone)]
pub struct Feed {
    kind: SourceKind,
    source: Option<PathBuf>,
    table: Option<DataFrame>,
}

impl Feed {
    /// Create a feed of `kind`. A file-based feed with a source is loaded
    /// right away; a live feed only records its source.
    pub fn new(
        kind: SourceKind,
        source: Option<&Path>,
        options: &CsvOptions,
    ) -> Result<Self, FeedError> {
        let mut feed = Self {
            kind,
            source: source.map(Path::to_path_buf),
            table: None,
        };
        if let (SourceKind::FileBased, Some(path)) = (kind, source) {
            feed.load_csv(path, options)?;
        }
        Ok(feed)
    }

    /// Load a CSV file with the given options. The path must be non-empty.
    pub fn csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self, FeedError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SourceError::EmptySourcePath.into());
        }
        Self::new(SourceKind::FileBased, Some(path), options)
    }

    /// Load an MT4 history export. The column layout is fixed; delimiter,
    /// skipped rows and formats are taken from `options`.
    pub fn mt4(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self, FeedError> {
        let options = CsvOptions {
            columns: ColumnLayout::mt4(),
            ..options.clone()
        };
        Self::csv(path, &options)
    }

    /// Read `path` into this feed, replacing any previous table.
    ///
    /// On error the feed is left exactly as it was.
    pub fn load_csv(
        &mut self,
        path: impl AsRef<Path>,
        options: &CsvOptions,
    ) -> Result<(), FeedError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SourceError::EmptySourcePath.into());
        }

        let table = match CsvLoader::new(options).and_then(|loader| loader.load(path)) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "feed load failed");
                return Err(e);
            }
        };

        self.table = Some(table);
        self.source = Some(path.to_path_buf());
        self.kind = SourceKind::FileBased;
        Ok(())
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Number of bars, 0 when nothing is loaded.
    pub fn len(&self) -> usize {
        self.table.as_ref().map_or(0, DataFrame::height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The loaded table.
    pub fn table(&self) -> Result<&DataFrame, FeedError> {
        self.table.as_ref().ok_or(FeedError::NoDataLoaded)
    }

    fn field(&self, field: Field) -> Result<&Column, FeedError> {
        Ok(self.table()?.column(field.as_str())?)
    }

    pub fn datetime(&self) -> Result<&Column, FeedError> {
        self.field(Field::Datetime)
    }

    pub fn open(&self) -> Result<&Column, FeedError> {
        self.field(Field::Open)
    }

    pub fn high(&self) -> Result<&Column, FeedError> {
        self.field(Field::High)
    }

    pub fn low(&self) -> Result<&Column, FeedError> {
        self.field(Field::Low)
    }

    pub fn close(&self) -> Result<&Column, FeedError> {
        self.field(Field::Close)
    }

    pub fn volume(&self) -> Result<&Column, FeedError> {
        self.field(Field::Volume)
    }

    /// Adjusted close, `None` when the layout had no such column.
    pub fn adj_close(&self) -> Result<Option<&Column>, FeedError> {
        Ok(self.table()?.column(Field::AdjClose.as_str()).ok())
    }

    /// Copy the table out as rows.
    pub fn bars(&self) -> Result<Vec<Bar>, FeedError> {
        let millis = self.datetime()?.cast(&DataType::Int64)?;
        let datetime = millis.i64()?;
        let open = self.open()?.f64()?;
        let high = self.high()?.f64()?;
        let low = self.low()?.f64()?;
        let close = self.close()?.f64()?;
        let volume = self.volume()?.f64()?;
        let adj_close = match self.adj_close()? {
            Some(column) => Some(column.f64()?),
            None => None,
        };

        let mut bars = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            // The loader never produces null timestamps.
            let Some(dt) = datetime.get(i).and_then(timestamp::from_millis) else {
                continue;
            };
            bars.push(Bar {
                datetime: dt,
                open: open.get(i).unwrap_or(f64::NAN),
                high: high.get(i).unwrap_or(f64::NAN),
                low: low.get(i).unwrap_or(f64::NAN),
                close: close.get(i).unwrap_or(f64::NAN),
                volume: volume.get(i).unwrap_or(f64::NAN),
                adj_close: adj_close.and_then(|ca| ca.get(i)),
            });
        }
        Ok(bars)
    }

    /// Earliest and latest timestamp, `None` for an empty table.
    pub fn date_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>, FeedError> {
        let millis = self.datetime()?.cast(&DataType::Int64)?;
        let values = millis.i64()?;
        let first = values.into_iter().flatten().min();
        let last = values.into_iter().flatten().max();
        Ok(first
            .zip(last)
            .and_then(|(a, b)| Some((timestamp::from_millis(a)?, timestamp::from_millis(b)?))))
    }
}
