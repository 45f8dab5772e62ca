use polars::prelude::{DataFrame, DataType, TimeUnit};

use super::columns::Field;
use super::error::SchemaError;

/// Column set of a loaded feed table.
pub struct FeedSchema;

impl FeedSchema {
    /// Physical type of the `datetime` column.
    pub fn datetime_dtype() -> DataType {
        DataType::Datetime(TimeUnit::Milliseconds, None)
    }

    /// Expected columns, in table order.
    pub fn columns(with_adj_close: bool) -> Vec<(Field, DataType)> {
        let mut columns = vec![
            (Field::Datetime, Self::datetime_dtype()),
            (Field::Open, DataType::Float64),
            (Field::High, DataType::Float64),
            (Field::Low, DataType::Float64),
            (Field::Close, DataType::Float64),
            (Field::Volume, DataType::Float64),
        ];
        if with_adj_close {
            columns.push((Field::AdjClose, DataType::Float64));
        }
        columns
    }

    /// Validate that `df` holds exactly the feed columns with the right types.
    pub fn validate(df: &DataFrame, with_adj_close: bool) -> Result<(), SchemaError> {
        let expected = Self::columns(with_adj_close);

        for (field, dtype) in &expected {
            let column = df
                .column(field.as_str())
                .map_err(|_| SchemaError::MissingColumn(field.to_string()))?;
            if column.dtype() != dtype {
                return Err(SchemaError::TypeMismatch {
                    column: field.to_string(),
                    expected: dtype.clone(),
                    actual: column.dtype().clone(),
                });
            }
        }

        for name in df.get_column_names() {
            if !expected.iter().any(|(field, _)| field.as_str() == name.as_str()) {
                return Err(SchemaError::UnexpectedColumn(name.to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn frame(extra: Option<Column>) -> DataFrame {
        let datetime = Column::new("datetime".into(), &[1704187800000i64])
            .cast(&FeedSchema::datetime_dtype())
            .unwrap();
        let mut columns = vec![
            datetime,
            Column::new("open".into(), &[1.1000]),
            Column::new("high".into(), &[1.1050]),
            Column::new("low".into(), &[1.0990]),
            Column::new("close".into(), &[1.1020]),
            Column::new("volume".into(), &[500.0]),
        ];
        columns.extend(extra);
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn accepts_feed_table() {
        assert!(FeedSchema::validate(&frame(None), false).is_ok());
    }

    #[test]
    fn accepts_adj_close_when_requested() {
        let df = frame(Some(Column::new("adj_close".into(), &[1.1015])));
        assert!(FeedSchema::validate(&df, true).is_ok());
    }

    #[test]
    fn rejects_missing_adj_close() {
        let result = FeedSchema::validate(&frame(None), true);
        assert!(matches!(result, Err(SchemaError::MissingColumn(c)) if c == "adj_close"));
    }

    #[test]
    fn rejects_leftover_date_column() {
        let df = frame(Some(Column::new("date".into(), &["2024.01.02"])));
        let result = FeedSchema::validate(&df, false);
        assert!(matches!(result, Err(SchemaError::UnexpectedColumn(c)) if c == "date"));
    }

    #[test]
    fn rejects_wrong_type() {
        let df = df!(
            "datetime" => &["2024-01-02 09:30"],
            "open" => &[1.1000],
            "high" => &[1.1050],
            "low" => &[1.0990],
            "close" => &[1.1020],
            "volume" => &[500.0],
        )
        .unwrap();
        let result = FeedSchema::validate(&df, false);
        assert!(matches!(result, Err(SchemaError::TypeMismatch { .. })));
    }
}
