//! Column mapping: physical CSV column positions → logical bar fields.
//!
//! Source files carry no header, so the caller states where each field lives.
//! [`ColumnMapping::new`] validates that assignment and yields the field order
//! that acts as the header for the reader.

use serde::{Deserialize, Deserializer};

use super::error::ConfigError;

/// Logical fields a feed file can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Calendar date, merged into `Datetime` during load and never stored.
    Date,
    /// Timestamp, or the time-of-day part when a separate date column exists.
    Datetime,
    Open,
    High,
    Low,
    Close,
    Volume,
    AdjClose,
}

impl Field {
    /// Column name in the loaded table.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Datetime => "datetime",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::AdjClose => "adj_close",
        }
    }

    /// Whether the field holds a price or volume parsed as `f64`.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Field::Date | Field::Datetime)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based physical column index of each field.
///
/// Defaults follow the MetaTrader 4 history export:
/// `date, time, open, high, low, close, volume`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnLayout {
    /// Separate date column. `None` means the time column holds full timestamps.
    #[serde(deserialize_with = "optional_index")]
    pub date: Option<usize>,
    pub time: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
    #[serde(deserialize_with = "optional_index")]
    pub adj_close: Option<usize>,
}

impl ColumnLayout {
    /// Fixed MT4 export layout.
    pub fn mt4() -> Self {
        Self {
            date: Some(0),
            time: 1,
            open: 2,
            high: 3,
            low: 4,
            close: 5,
            volume: 6,
            adj_close: None,
        }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::mt4()
    }
}

/// Negative indices in config files mean "no such column".
fn optional_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|index| usize::try_from(index).ok()))
}

/// A validated layout: fields in physical column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    fields: Vec<Field>,
    merge_date: bool,
}

impl ColumnMapping {
    /// Validate `layout` and order its fields by physical position.
    ///
    /// Checks run in a fixed order: time/date placement and formats first,
    /// then duplicate indices, then gaps between the lowest and highest index,
    /// and finally that the lowest index is 0.
    pub fn new(
        layout: &ColumnLayout,
        date_format: &str,
        time_format: &str,
    ) -> Result<Self, ConfigError> {
        let mut claims: Vec<(usize, Field)> = Vec::with_capacity(8);

        match layout.date {
            None => {
                if layout.time == 0 {
                    return Err(ConfigError::MissingTimeColumn);
                }
            }
            Some(index) => {
                if date_format.is_empty() {
                    return Err(ConfigError::MissingDateFormat);
                }
                claims.push((index, Field::Date));
            }
        }

        if time_format.is_empty() {
            return Err(ConfigError::MissingTimeFormat);
        }

        claims.extend([
            (layout.time, Field::Datetime),
            (layout.open, Field::Open),
            (layout.high, Field::High),
            (layout.low, Field::Low),
            (layout.close, Field::Close),
            (layout.volume, Field::Volume),
        ]);
        if let Some(index) = layout.adj_close {
            claims.push((index, Field::AdjClose));
        }

        // Stable: duplicates are reported in registration order.
        claims.sort_by_key(|&(index, _)| index);

        for pair in claims.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ConfigError::DuplicateColumn {
                    index: pair[0].0,
                    first: pair[0].1.as_str(),
                    second: pair[1].1.as_str(),
                });
            }
        }

        let min = claims[0].0;
        for (expected, &(index, _)) in (min..).zip(claims.iter()) {
            if index != expected {
                return Err(ConfigError::NonContiguousColumns { missing: expected });
            }
        }

        if min != 0 {
            return Err(ConfigError::MissingColumnZero { min });
        }

        Ok(Self {
            fields: claims.into_iter().map(|(_, field)| field).collect(),
            merge_date: layout.date.is_some(),
        })
    }

    /// Fields ordered by physical column index.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Column names ordered by physical column index.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.as_str()).collect()
    }

    /// Number of columns every record must have.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Physical position of `field`, if mapped.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|&f| f == field)
    }

    /// True when a separate date column must be merged into `datetime`.
    pub fn merges_date(&self) -> bool {
        self.merge_date
    }

    pub fn has_adj_close(&self) -> bool {
        self.fields.contains(&Field::AdjClose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE_FMT: &str = "%Y.%m.%d";
    const TIME_FMT: &str = "%H:%M";

    fn map(layout: &ColumnLayout) -> Result<ColumnMapping, ConfigError> {
        ColumnMapping::new(layout, DATE_FMT, TIME_FMT)
    }

    #[test]
    fn mt4_layout_maps_in_file_order() {
        let mapping = map(&ColumnLayout::mt4()).unwrap();
        assert_eq!(
            mapping.field_names(),
            vec!["date", "datetime", "open", "high", "low", "close", "volume"]
        );
        assert!(mapping.merges_date());
        assert!(!mapping.has_adj_close());
        assert_eq!(mapping.width(), 7);
    }

    #[test]
    fn shuffled_layout_with_adj_close() {
        let layout = ColumnLayout {
            date: Some(7),
            time: 6,
            open: 0,
            high: 1,
            low: 2,
            close: 3,
            volume: 5,
            adj_close: Some(4),
        };
        let mapping = map(&layout).unwrap();
        assert_eq!(
            mapping.field_names(),
            vec!["open", "high", "low", "close", "adj_close", "volume", "datetime", "date"]
        );
        assert_eq!(mapping.position(Field::Date), Some(7));
        assert!(mapping.has_adj_close());
    }

    #[test]
    fn no_date_column_needs_time_after_column_zero() {
        let layout = ColumnLayout {
            date: None,
            time: 0,
            open: 1,
            high: 2,
            low: 3,
            close: 4,
            volume: 5,
            adj_close: None,
        };
        assert!(matches!(map(&layout), Err(ConfigError::MissingTimeColumn)));
    }

    #[test]
    fn no_date_column_with_time_at_one() {
        let layout = ColumnLayout {
            date: None,
            time: 1,
            open: 0,
            high: 2,
            low: 3,
            close: 4,
            volume: 5,
            adj_close: None,
        };
        let mapping = map(&layout).unwrap();
        assert!(!mapping.merges_date());
        assert_eq!(mapping.position(Field::Date), None);
        assert_eq!(mapping.fields()[1], Field::Datetime);
    }

    #[test]
    fn date_column_requires_date_format() {
        let err = ColumnMapping::new(&ColumnLayout::mt4(), "", TIME_FMT).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDateFormat));
    }

    #[test]
    fn time_format_required_with_and_without_date() {
        let err = ColumnMapping::new(&ColumnLayout::mt4(), DATE_FMT, "").unwrap_err();
        assert!(matches!(err, ConfigError::MissingTimeFormat));

        let layout = ColumnLayout {
            date: None,
            time: 1,
            open: 0,
            ..ColumnLayout::mt4()
        };
        let err = ColumnMapping::new(&layout, DATE_FMT, "").unwrap_err();
        assert!(matches!(err, ConfigError::MissingTimeFormat));
    }

    #[test]
    fn duplicate_index_names_both_fields() {
        let layout = ColumnLayout {
            high: 2,
            ..ColumnLayout::mt4()
        };
        match map(&layout) {
            Err(ConfigError::DuplicateColumn {
                index,
                first,
                second,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(first, "open");
                assert_eq!(second, "high");
            }
            other => panic!("expected DuplicateColumn, got {other:?}"),
        }
    }

    #[test]
    fn gap_in_indices_is_rejected() {
        let layout = ColumnLayout {
            volume: 7,
            ..ColumnLayout::mt4()
        };
        assert!(matches!(
            map(&layout),
            Err(ConfigError::NonContiguousColumns { missing: 6 })
        ));
    }

    #[test]
    fn indices_must_start_at_zero() {
        let layout = ColumnLayout {
            date: Some(7),
            ..ColumnLayout::mt4()
        };
        assert!(matches!(
            map(&layout),
            Err(ConfigError::MissingColumnZero { min: 1 })
        ));
    }

    #[test]
    fn gap_is_reported_before_missing_zero() {
        let layout = ColumnLayout {
            date: Some(9),
            volume: 8,
            ..ColumnLayout::mt4()
        };
        assert!(matches!(
            map(&layout),
            Err(ConfigError::NonContiguousColumns { missing: 6 })
        ));
    }
}
