//! Dataframe errors

use arrow::datatypes::DataType as ArrowType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::fmt;

#[derive(Debug)]
pub enum FrameError {
    /// Failure inside an Arrow kernel or codec
    Arrow(ArrowError),
    /// Failure inside the Parquet codec
    Parquet(ParquetError),
    /// Row data could not be serialized
    Json(serde_json::Error),
    /// IO failure while rewinding or flushing a buffer
    Io(std::io::Error),
    /// Column requested by name is not in the table
    ColumnNotFound(String),
    /// A parse rule was applied to a non-string column
    NotUtf8 { column: String, found: ArrowType },
    /// A value did not match the column's parse format
    Parse {
        column: String,
        value: String,
        format: String,
    },
    /// A value could not be rendered with the column's format
    Format { column: String, format: String },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Arrow(err) => write!(f, "Arrow error: {}", err),
            FrameError::Parquet(err) => write!(f, "Parquet error: {}", err),
            FrameError::Json(err) => write!(f, "JSON error: {}", err),
            FrameError::Io(err) => write!(f, "IO error: {}", err),
            FrameError::ColumnNotFound(name) => write!(f, "Column '{}' not found in table", name),
            FrameError::NotUtf8 { column, found } => {
                write!(f, "Column '{}' must be Utf8 to be parsed, found {}", column, found)
            }
            FrameError::Parse { column, value, format } => {
                write!(
                    f,
                    "Value '{}' in column '{}' does not match format '{}'",
                    value, column, format
                )
            }
            FrameError::Format { column, format } => {
                write!(f, "Column '{}' cannot be rendered with format '{}'", column, format)
            }
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Arrow(err) => Some(err),
            FrameError::Parquet(err) => Some(err),
            FrameError::Json(err) => Some(err),
            FrameError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArrowError> for FrameError {
    fn from(err: ArrowError) -> Self {
        FrameError::Arrow(err)
    }
}

impl From<ParquetError> for FrameError {
    fn from(err: ParquetError) -> Self {
        FrameError::Parquet(err)
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(err: serde_json::Error) -> Self {
        FrameError::Json(err)
    }
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::Io(err)
    }
}
