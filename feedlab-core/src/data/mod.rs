//! CSV ingestion: column mapping, read options, loading and validation.

pub mod columns;
pub mod error;
pub mod loader;
pub mod options;
pub mod schema;
pub mod timestamp;

pub use columns::{ColumnLayout, ColumnMapping, Field};
pub use error::{ConfigError, FeedError, ParseError, SchemaError, SourceError};
pub use loader::CsvLoader;
pub use options::{CsvOptions, SkipRows};
pub use schema::FeedSchema;
